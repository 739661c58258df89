//! In-memory query backend for exercising the comparator without a database
//!
//! Tables are column names plus rows of optional text values. Filters are
//! registered by their exact filter text together with a Rust predicate, so a
//! `TableRef` carrying `status = 'active'` selects the rows the matching
//! predicate accepts. An unregistered filter is an error, like invalid SQL.

use crate::backend::{bounded_fetch, QueryBackend, ValueFetch};
use crate::diff::{ValueCounts, ValueKey};
use crate::error::{CompareError, Result};
use crate::table::TableRef;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// A table held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl MemoryTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; `None` is NULL. Short rows are padded with NULL.
    pub fn row<S: Into<String>>(mut self, values: impl IntoIterator<Item = Option<S>>) -> Self {
        let mut row: Vec<Option<String>> = values.into_iter().map(|v| v.map(Into::into)).collect();
        row.resize(self.columns.len(), None);
        self.rows.push(row);
        self
    }

    /// Append `n` copies of the same row
    pub fn repeat_row<S: Into<String> + Clone>(mut self, n: usize, values: &[Option<S>]) -> Self {
        for _ in 0..n {
            self = self.row(values.iter().cloned());
        }
        self
    }

    fn column_index(&self, table: &str, column: &str) -> Result<usize> {
        self.columns.iter().position(|c| c == column).ok_or_else(|| {
            CompareError::backend(format!("Column '{}' not found in table '{}'", column, table))
        })
    }
}

/// Read access to one row, handed to filter predicates
pub struct MemoryRow<'a> {
    columns: &'a [String],
    values: &'a [Option<String>],
}

impl<'a> MemoryRow<'a> {
    /// Value of a column; `None` for NULL or an unknown column
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values[i].as_deref())
    }
}

type RowPredicate = Box<dyn Fn(&MemoryRow<'_>) -> bool>;

/// One query issued against the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryRecord {
    Describe { table: String },
    CountRows { table: String },
    DistinctCount { table: String, column: String },
    ValueCounts { table: String, column: String },
}

impl QueryRecord {
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::DistinctCount { column, .. } | Self::ValueCounts { column, .. } => Some(column.as_str()),
            _ => None,
        }
    }
}

/// Query backend over [`MemoryTable`]s
#[derive(Default)]
pub struct MemoryBackend {
    tables: HashMap<String, MemoryTable>,
    filters: HashMap<String, RowPredicate>,
    failing_columns: HashSet<(String, String)>,
    queries: RefCell<Vec<QueryRecord>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, name: impl Into<String>, table: MemoryTable) -> Self {
        self.tables.insert(name.into(), table);
        self
    }

    /// Register the predicate standing in for a filter expression
    pub fn with_filter<F>(mut self, filter: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&MemoryRow<'_>) -> bool + 'static,
    {
        self.filters.insert(filter.into(), Box::new(predicate));
        self
    }

    /// Make every per-column query on `table.column` fail
    pub fn with_failing_column(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.failing_columns.insert((table.into(), column.into()));
        self
    }

    /// Queries issued so far, in order
    pub fn queries(&self) -> Vec<QueryRecord> {
        self.queries.borrow().clone()
    }

    fn record(&self, query: QueryRecord) {
        log::debug!("memory query: {:?}", query);
        self.queries.borrow_mut().push(query);
    }

    fn table(&self, table: &TableRef) -> Result<&MemoryTable> {
        self.tables
            .get(table.name())
            .ok_or_else(|| CompareError::backend(format!("Table '{}' does not exist", table.name())))
    }

    fn check_column(&self, table: &TableRef, column: &str) -> Result<usize> {
        if self
            .failing_columns
            .contains(&(table.name().to_string(), column.to_string()))
        {
            return Err(CompareError::backend(format!(
                "Injected failure for {}.{}",
                table.name(),
                column
            )));
        }
        self.table(table)?.column_index(table.name(), column)
    }

    /// Rows of the table that pass its filter
    fn filtered_rows<'a>(&'a self, table: &TableRef) -> Result<Vec<&'a [Option<String>]>> {
        let data = self.table(table)?;
        let predicate = match table.filter() {
            Some(filter) => Some(self.filters.get(filter).ok_or_else(|| {
                CompareError::backend(format!("Unsupported filter expression: {}", filter))
            })?),
            None => None,
        };

        Ok(data
            .rows
            .iter()
            .map(Vec::as_slice)
            .filter(|row| match predicate {
                Some(predicate) => predicate(&MemoryRow {
                    columns: &data.columns,
                    values: *row,
                }),
                None => true,
            })
            .collect())
    }
}

impl QueryBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn describe_columns(&self, table: &TableRef) -> Result<Vec<String>> {
        self.record(QueryRecord::Describe {
            table: table.name().to_string(),
        });
        Ok(self.table(table)?.columns.clone())
    }

    fn count_rows(&self, table: &TableRef) -> Result<u64> {
        self.record(QueryRecord::CountRows {
            table: table.name().to_string(),
        });
        Ok(self.filtered_rows(table)?.len() as u64)
    }

    fn distinct_count(&self, table: &TableRef, column: &str) -> Result<u64> {
        self.record(QueryRecord::DistinctCount {
            table: table.name().to_string(),
            column: column.to_string(),
        });
        let index = self.check_column(table, column)?;
        let distinct: HashSet<&str> = self
            .filtered_rows(table)?
            .into_iter()
            .filter_map(|values| values[index].as_deref())
            .collect();
        Ok(distinct.len() as u64)
    }

    fn value_counts(
        &self,
        table: &TableRef,
        column: &str,
        limit: Option<usize>,
    ) -> Result<ValueFetch> {
        self.record(QueryRecord::ValueCounts {
            table: table.name().to_string(),
            column: column.to_string(),
        });
        let index = self.check_column(table, column)?;

        let mut counts = ValueCounts::new();
        for values in self.filtered_rows(table)? {
            *counts.entry(ValueKey::from(values[index].clone())).or_insert(0) += 1;
        }
        Ok(bounded_fetch(counts, limit))
    }
}
