//! Findings, the comparison report and the append-only report log

use crate::config::Checks;
use crate::diff::{ColumnSetDiff, ValueCountDiff};
use crate::error::Result;
use crate::output::ReportRenderer;
use crate::table::TableRef;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One comparison outcome, match or mismatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Finding {
    RowCount {
        count_a: u64,
        count_b: u64,
    },
    ColumnSet {
        #[serde(flatten)]
        diff: ColumnSetDiff,
    },
    DistinctCount {
        column: String,
        count_a: u64,
        count_b: u64,
    },
    ValueCounts {
        column: String,
        #[serde(flatten)]
        diff: ValueCountDiff,
    },
    /// Too many distinct values on at least one side to materialize
    ValueCheckSkipped {
        column: String,
        limit: usize,
    },
}

/// Report sections in their fixed output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
    RowCount,
    Columns,
    DistinctCounts,
    Values,
}

impl Finding {
    pub fn section(&self) -> Section {
        match self {
            Self::RowCount { .. } => Section::RowCount,
            Self::ColumnSet { .. } => Section::Columns,
            Self::DistinctCount { .. } => Section::DistinctCounts,
            Self::ValueCounts { .. } | Self::ValueCheckSkipped { .. } => Section::Values,
        }
    }

    /// Whether this finding reports a difference between the tables.
    /// A skipped value check is a limitation, not a mismatch.
    pub fn is_mismatch(&self) -> bool {
        match self {
            Self::RowCount { count_a, count_b } => count_a != count_b,
            Self::ColumnSet { diff } => diff.has_differences(),
            Self::DistinctCount {
                count_a, count_b, ..
            } => count_a != count_b,
            Self::ValueCounts { diff, .. } => diff.has_differences(),
            Self::ValueCheckSkipped { .. } => false,
        }
    }
}

/// Everything one run found, in discovery order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub table_a: TableRef,
    pub table_b: TableRef,
    pub checks: Checks,
    pub findings: Vec<Finding>,
}

impl ComparisonReport {
    pub fn mismatch_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_mismatch()).count()
    }

    pub fn has_mismatches(&self) -> bool {
        self.findings.iter().any(Finding::is_mismatch)
    }

    pub fn row_counts(&self) -> Option<(u64, u64)> {
        self.findings.iter().find_map(|f| match f {
            Finding::RowCount { count_a, count_b } => Some((*count_a, *count_b)),
            _ => None,
        })
    }

    pub fn column_set(&self) -> Option<&ColumnSetDiff> {
        self.findings.iter().find_map(|f| match f {
            Finding::ColumnSet { diff } => Some(diff),
            _ => None,
        })
    }

    pub fn value_diff(&self, column: &str) -> Option<&ValueCountDiff> {
        self.findings.iter().find_map(|f| match f {
            Finding::ValueCounts { column: c, diff } if c == column => Some(diff),
            _ => None,
        })
    }

    /// Columns that were value-compared or skipped, in order
    pub fn value_columns(&self) -> Vec<&str> {
        self.findings
            .iter()
            .filter_map(|f| match f {
                Finding::ValueCounts { column, .. } | Finding::ValueCheckSkipped { column, .. } => {
                    Some(column.as_str())
                }
                _ => None,
            })
            .collect()
    }
}

/// Receives findings as the comparator discovers them
pub trait FindingSink {
    fn record(&mut self, finding: &Finding) -> Result<()>;

    /// A per-column section is starting over `columns` common columns.
    /// Called for every enabled section, even with no columns to check.
    fn begin_section(&mut self, _section: Section, _columns: usize) -> Result<()> {
        Ok(())
    }
}

impl FindingSink for Vec<Finding> {
    fn record(&mut self, finding: &Finding) -> Result<()> {
        self.push(finding.clone());
        Ok(())
    }
}

/// Console and/or timestamped log file receiving rendered report lines
pub struct ReportLog {
    console: bool,
    file: Option<(PathBuf, BufWriter<File>)>,
    renderer: ReportRenderer,
}

impl ReportLog {
    /// Create the sink. With `log_dir` set, a new
    /// `compare_log_<timestamp>.txt` file is created inside it.
    pub fn create(table_a: &TableRef, table_b: &TableRef, console: bool, log_dir: Option<&Path>) -> Result<Self> {
        let file = match log_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
                let path = dir.join(log_file_name(chrono::Local::now()));
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create log file {}", path.display()))?;
                log::debug!("Writing report to {}", path.display());
                Some((path, BufWriter::new(file)))
            }
            None => None,
        };

        Ok(Self {
            console,
            file,
            renderer: ReportRenderer::new(table_a, table_b),
        })
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.file.as_ref().map(|(path, _)| path.as_path())
    }

    /// Write the opening banner
    pub fn banner(&mut self) -> Result<()> {
        let lines = self.renderer.banner();
        self.write_lines(&lines)
    }

    /// Write section summaries and the closing line, then flush
    pub fn finish(mut self) -> Result<Option<PathBuf>> {
        let mut lines = self.renderer.finish();
        if let Some(path) = self.log_path() {
            lines.push(format!("📝 Log saved to {}", path.display()));
        }
        self.write_lines(&lines)?;

        match self.file.take() {
            Some((path, mut writer)) => {
                writer.flush()?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }

    fn write_lines(&mut self, lines: &[String]) -> Result<()> {
        for line in lines {
            if self.console {
                println!("{}", line);
            }
            if let Some((_, writer)) = self.file.as_mut() {
                writeln!(writer, "{}", line)?;
            }
        }
        Ok(())
    }
}

impl FindingSink for ReportLog {
    fn record(&mut self, finding: &Finding) -> Result<()> {
        let lines = self.renderer.render(finding);
        self.write_lines(&lines)
    }

    fn begin_section(&mut self, section: Section, columns: usize) -> Result<()> {
        let lines = self.renderer.begin_section(section, columns);
        self.write_lines(&lines)
    }
}

/// `compare_log_YYYY-MM-DD_HH-MM-SS.txt`
pub fn log_file_name<Tz: chrono::TimeZone>(at: chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("compare_log_{}.txt", at.format("%Y-%m-%d_%H-%M-%S"))
}
