//! Command-line interface for tabcompare

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tabcompare")]
#[command(about = "Compare two database tables by row count, columns, distinct counts and values")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./tabcompare.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a template config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Compare two tables
    Compare {
        /// First table (database.schema.table); overrides the config file
        table_a: Option<String>,

        /// Second table (database.schema.table); overrides the config file
        table_b: Option<String>,

        /// Row filter for the first table, e.g. "STATUS = 'active'"
        #[arg(long)]
        filter_a: Option<String>,

        /// Row filter for the second table
        #[arg(long)]
        filter_b: Option<String>,

        /// Column to leave out of every check (repeatable)
        #[arg(long = "exclude", value_name = "COLUMN")]
        exclude: Vec<String>,

        /// Skip the column-set check
        #[arg(long)]
        no_columns: bool,

        /// Also compare per-column distinct counts
        #[arg(long)]
        distinct: bool,

        /// Skip the value-level check
        #[arg(long)]
        no_values: bool,

        /// Order common columns by name instead of the first table's order
        #[arg(long)]
        sort_columns: bool,

        /// Skip value checks for columns with more distinct values (0 = no bound)
        #[arg(long)]
        max_distinct_values: Option<usize>,

        /// Directory for the timestamped log file
        #[arg(long)]
        log_dir: Option<PathBuf>,

        /// Do not write a log file
        #[arg(long)]
        no_log_file: bool,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,

        /// Exit with status 2 when any check reports a difference
        #[arg(long)]
        fail_on_mismatch: bool,
    },

    /// List a table's columns after exclusions
    Columns {
        /// Table (database.schema.table)
        table: String,

        /// Column to leave out (repeatable)
        #[arg(long = "exclude", value_name = "COLUMN")]
        exclude: Vec<String>,
    },
}

/// Parse output format string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}
