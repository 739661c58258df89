//! The table comparator: row counts, column sets, distinct counts, values

use crate::backend::{QueryBackend, ValueFetch};
use crate::config::Checks;
use crate::diff::{diff_column_sets, diff_value_counts, exclude_columns, ColumnSetDiff, ValueCountDiff};
use crate::error::Result;
use crate::progress::ProgressReporter;
use crate::report::{ComparisonReport, Finding, FindingSink, Section};
use crate::table::TableRef;

/// Row counts of both tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCountCheck {
    pub count_a: u64,
    pub count_b: u64,
    pub matched: bool,
}

/// What one comparator run looks at
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonOptions {
    pub excluded_columns: Vec<String>,
    pub checks: Checks,
    pub sort_common: bool,
    /// Bound on distinct values per column and table; `None` is unbounded
    pub value_limit: Option<usize>,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            excluded_columns: Vec::new(),
            checks: Checks::default(),
            sort_common: false,
            value_limit: Some(crate::config::DEFAULT_MAX_DISTINCT_VALUES),
        }
    }
}

/// Compares two tables through one backend, one query at a time.
///
/// The two tables are read by separate queries, not inside one snapshot. If
/// either table changes during a run, its counts can disagree with the other
/// side even when the tables are otherwise equivalent; such differences are
/// reported as found.
pub struct TableComparator<'b, B: QueryBackend> {
    backend: &'b B,
    table_a: TableRef,
    table_b: TableRef,
    options: ComparisonOptions,
    progress: ProgressReporter,
}

impl<'b, B: QueryBackend> TableComparator<'b, B> {
    pub fn new(backend: &'b B, table_a: TableRef, table_b: TableRef, options: ComparisonOptions) -> Self {
        Self {
            backend,
            table_a,
            table_b,
            options,
            progress: ProgressReporter::new_minimal(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    pub fn compare_row_counts(&self) -> Result<RowCountCheck> {
        let count_a = self.backend.count_rows(&self.table_a)?;
        let count_b = self.backend.count_rows(&self.table_b)?;
        log::debug!("Row counts: {} = {}, {} = {}", self.table_a, count_a, self.table_b, count_b);

        Ok(RowCountCheck {
            count_a,
            count_b,
            matched: count_a == count_b,
        })
    }

    /// Declared columns of `table` minus the excluded names
    pub fn list_columns(&self, table: &TableRef) -> Result<Vec<String>> {
        let columns = self.backend.describe_columns(table)?;
        Ok(exclude_columns(columns, &self.options.excluded_columns))
    }

    pub fn diff_columns(&self) -> Result<ColumnSetDiff> {
        let cols_a = self.list_columns(&self.table_a)?;
        let cols_b = self.list_columns(&self.table_b)?;

        let mut diff = diff_column_sets(&cols_a, &cols_b);
        if self.options.sort_common {
            diff.common.sort();
        }
        Ok(diff)
    }

    /// Distinct counts of `column` in both tables
    pub fn compare_distinct(&self, column: &str) -> Result<(u64, u64)> {
        let count_a = self.backend.distinct_count(&self.table_a, column)?;
        let count_b = self.backend.distinct_count(&self.table_b, column)?;
        Ok((count_a, count_b))
    }

    /// Value-level comparison of `column`; `None` when a side exceeds the bound
    pub fn compare_values(&self, column: &str) -> Result<Option<ValueCountDiff>> {
        let limit = self.options.value_limit;

        let counts_a = match self.backend.value_counts(&self.table_a, column, limit)? {
            ValueFetch::Complete(counts) => counts,
            ValueFetch::TooManyValues { limit } => {
                log::warn!("{}.{} has more than {} distinct values", self.table_a.name(), column, limit);
                return Ok(None);
            }
        };
        let counts_b = match self.backend.value_counts(&self.table_b, column, limit)? {
            ValueFetch::Complete(counts) => counts,
            ValueFetch::TooManyValues { limit } => {
                log::warn!("{}.{} has more than {} distinct values", self.table_b.name(), column, limit);
                return Ok(None);
            }
        };

        Ok(Some(diff_value_counts(&counts_a, &counts_b)))
    }

    /// Run every enabled check, recording findings to `sink` in discovery
    /// order. The first query failure aborts the run.
    pub fn run(&mut self, sink: &mut dyn FindingSink) -> Result<ComparisonReport> {
        log::info!(
            "Comparing {} with {} using {} backend",
            self.table_a,
            self.table_b,
            self.backend.name()
        );
        let checks = self.options.checks;
        let mut findings = Vec::new();

        self.progress.start_step("Counting rows...");
        let rows = self.compare_row_counts()?;
        self.emit(
            sink,
            &mut findings,
            Finding::RowCount {
                count_a: rows.count_a,
                count_b: rows.count_b,
            },
        )?;

        let per_column = checks.distinct_counts || checks.values;
        let common = if checks.columns || per_column {
            self.progress.start_step("Listing columns...");
            let diff = self.diff_columns()?;
            let common = diff.common.clone();
            if checks.columns {
                self.emit(sink, &mut findings, Finding::ColumnSet { diff })?;
            }
            common
        } else {
            Vec::new()
        };
        self.progress.finish_step();

        if checks.distinct_counts {
            self.begin_section(sink, Section::DistinctCounts, common.len())?;
            self.progress.start_columns(common.len() as u64, "Distinct counts");
            for column in &common {
                self.progress.on_column(column);
                let (count_a, count_b) = self.compare_distinct(column)?;
                self.emit(
                    sink,
                    &mut findings,
                    Finding::DistinctCount {
                        column: column.clone(),
                        count_a,
                        count_b,
                    },
                )?;
                self.progress.column_done();
            }
            self.progress.finish_columns();
        }

        if checks.values {
            self.begin_section(sink, Section::Values, common.len())?;
            self.progress.start_columns(common.len() as u64, "Values");
            for column in &common {
                self.progress.on_column(column);
                let finding = match self.compare_values(column)? {
                    Some(diff) => Finding::ValueCounts {
                        column: column.clone(),
                        diff,
                    },
                    None => Finding::ValueCheckSkipped {
                        column: column.clone(),
                        // Only reachable with a bound set
                        limit: self.options.value_limit.unwrap_or_default(),
                    },
                };
                self.emit(sink, &mut findings, finding)?;
                self.progress.column_done();
            }
            self.progress.finish_columns();
        }

        let report = ComparisonReport {
            table_a: self.table_a.clone(),
            table_b: self.table_b.clone(),
            checks,
            findings,
        };
        log::info!("Comparison finished with {} mismatching check(s)", report.mismatch_count());
        Ok(report)
    }

    fn begin_section(&self, sink: &mut dyn FindingSink, section: Section, columns: usize) -> Result<()> {
        self.progress.suspend(|| sink.begin_section(section, columns))
    }

    fn emit(&self, sink: &mut dyn FindingSink, findings: &mut Vec<Finding>, finding: Finding) -> Result<()> {
        if finding.is_mismatch() {
            log::debug!("Mismatch: {:?}", finding);
        }
        self.progress.suspend(|| sink.record(&finding))?;
        findings.push(finding);
        Ok(())
    }
}
