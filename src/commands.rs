//! Command implementations for the tabcompare CLI

use crate::backend::QueryBackend;
use crate::cli::{Commands, OutputFormat};
use crate::comparator::{ComparisonOptions, TableComparator};
use crate::config::{self, AppConfig, ComparisonConfig};
use crate::diff::exclude_columns;
use crate::duckdb_backend::DuckDbBackend;
use crate::error::{CompareError, Result};
use crate::output::JsonFormatter;
use crate::progress::ProgressReporter;
use crate::report::{ComparisonReport, ReportLog};
use crate::table::TableRef;
use std::path::{Path, PathBuf};

/// How a successful command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Success,
    /// Differences were found and the caller asked for a failing exit
    MismatchesFound,
}

impl CommandOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::MismatchesFound => 2,
        }
    }
}

/// Command-line values that override the config file's comparison section
#[derive(Debug, Clone, Default)]
pub struct CompareOverrides {
    pub table_a: Option<String>,
    pub table_b: Option<String>,
    pub filter_a: Option<String>,
    pub filter_b: Option<String>,
    pub exclude: Vec<String>,
    pub no_columns: bool,
    pub distinct: bool,
    pub no_values: bool,
    pub sort_columns: bool,
    pub max_distinct_values: Option<usize>,
    pub log_dir: Option<PathBuf>,
    pub no_log_file: bool,
}

impl CompareOverrides {
    /// Flags only ever switch checks on or off relative to the config
    pub fn apply(self, mut config: ComparisonConfig) -> ComparisonConfig {
        if self.table_a.is_some() {
            config.table_a = self.table_a;
        }
        if self.table_b.is_some() {
            config.table_b = self.table_b;
        }
        if self.filter_a.is_some() {
            config.filter_a = self.filter_a;
        }
        if self.filter_b.is_some() {
            config.filter_b = self.filter_b;
        }
        for column in self.exclude {
            if !config.excluded_columns.contains(&column) {
                config.excluded_columns.push(column);
            }
        }
        if self.no_columns {
            config.checks.columns = false;
        }
        if self.distinct {
            config.checks.distinct_counts = true;
        }
        if self.no_values {
            config.checks.values = false;
        }
        if self.sort_columns {
            config.sort_common = true;
        }
        if let Some(max) = self.max_distinct_values {
            config.max_distinct_values = max;
        }
        if self.log_dir.is_some() {
            config.log_dir = self.log_dir;
        }
        if self.no_log_file {
            config.write_log_file = false;
        }
        config
    }
}

/// Execute a command
pub fn execute_command(command: Commands, config_path: Option<&Path>) -> Result<CommandOutcome> {
    match command {
        Commands::Init { force } => init_command(config_path, force),
        Commands::Compare {
            table_a,
            table_b,
            filter_a,
            filter_b,
            exclude,
            no_columns,
            distinct,
            no_values,
            sort_columns,
            max_distinct_values,
            log_dir,
            no_log_file,
            format,
            fail_on_mismatch,
        } => {
            let overrides = CompareOverrides {
                table_a,
                table_b,
                filter_a,
                filter_b,
                exclude,
                no_columns,
                distinct,
                no_values,
                sort_columns,
                max_distinct_values,
                log_dir,
                no_log_file,
            };
            compare_command(config_path, overrides, &format, fail_on_mismatch)
        }
        Commands::Columns { table, exclude } => columns_command(config_path, &table, exclude),
    }
}

/// Write a template config file
fn init_command(config_path: Option<&Path>, force: bool) -> Result<CommandOutcome> {
    let path = config_path.unwrap_or_else(|| Path::new(config::DEFAULT_CONFIG_FILE));
    AppConfig::write_template(path, force)?;

    println!("✅ Wrote config template: {}", path.display());
    println!("📁 Edit the connection and comparison sections, then run: tabcompare compare");
    Ok(CommandOutcome::Success)
}

/// Compare two tables and report every finding
fn compare_command(
    config_path: Option<&Path>,
    overrides: CompareOverrides,
    format: &str,
    fail_on_mismatch: bool,
) -> Result<CommandOutcome> {
    let format = OutputFormat::parse(format).map_err(CompareError::invalid_input)?;

    config::load_env_file()?;
    let app_config = AppConfig::load_or_default(config_path)?;
    let comparison = overrides.apply(app_config.comparison);
    let (table_a, table_b) = resolve_tables(&comparison)?;

    let backend = DuckDbBackend::open(&app_config.connection)?;
    let report = run_comparison(&backend, table_a, table_b, &comparison, format)?;
    backend.close()?;

    if format == OutputFormat::Json {
        println!("{}", JsonFormatter::format_report(&report)?);
    }

    if fail_on_mismatch && report.has_mismatches() {
        Ok(CommandOutcome::MismatchesFound)
    } else {
        Ok(CommandOutcome::Success)
    }
}

/// Run one comparison against any backend, writing the report log
pub fn run_comparison<B: QueryBackend>(
    backend: &B,
    table_a: TableRef,
    table_b: TableRef,
    comparison: &ComparisonConfig,
    format: OutputFormat,
) -> Result<ComparisonReport> {
    let log_dir = comparison
        .write_log_file
        .then(|| comparison.log_dir.clone().unwrap_or_else(|| PathBuf::from(".")));

    let console = format == OutputFormat::Pretty;
    let mut log = ReportLog::create(&table_a, &table_b, console, log_dir.as_deref())?;
    log.banner()?;

    let options = ComparisonOptions {
        excluded_columns: comparison.excluded_columns.clone(),
        checks: comparison.checks,
        sort_common: comparison.sort_common,
        value_limit: comparison.value_limit(),
    };
    let progress = if console {
        ProgressReporter::new()
    } else {
        ProgressReporter::new_minimal()
    };

    let report = TableComparator::new(backend, table_a, table_b, options)
        .with_progress(progress)
        .run(&mut log)?;

    if let Some(path) = log.finish()? {
        log::info!("Report written to {}", path.display());
    }
    Ok(report)
}

/// Print a table's columns after exclusions
fn columns_command(config_path: Option<&Path>, table: &str, exclude: Vec<String>) -> Result<CommandOutcome> {
    config::load_env_file()?;
    let app_config = AppConfig::load_or_default(config_path)?;
    let table = TableRef::parse(table)?;

    let mut excluded = app_config.comparison.excluded_columns;
    excluded.extend(exclude);

    let backend = DuckDbBackend::open(&app_config.connection)?;
    let columns = exclude_columns(backend.describe_columns(&table)?, &excluded);
    backend.close()?;

    if columns.is_empty() {
        println!("No columns left in {} after exclusions.", table.name());
        return Ok(CommandOutcome::Success);
    }

    println!("📋 Columns of {}:", table.name());
    for (i, column) in columns.iter().enumerate() {
        let prefix = if i == columns.len() - 1 { "└─" } else { "├─" };
        println!("{} {}", prefix, column);
    }
    Ok(CommandOutcome::Success)
}

fn resolve_tables(comparison: &ComparisonConfig) -> Result<(TableRef, TableRef)> {
    let name_a = comparison.table_a.as_deref().ok_or_else(|| {
        CompareError::config("No first table given (argument or comparison.table_a)")
    })?;
    let name_b = comparison.table_b.as_deref().ok_or_else(|| {
        CompareError::config("No second table given (argument or comparison.table_b)")
    })?;

    let table_a = TableRef::parse(name_a)?.with_filter(comparison.filter_a.as_deref());
    let table_b = TableRef::parse(name_b)?.with_filter(comparison.filter_b.as_deref());
    Ok((table_a, table_b))
}
