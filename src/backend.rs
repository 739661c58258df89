//! Query surface the comparator consumes from a database engine

use crate::diff::ValueCounts;
use crate::error::Result;
use crate::table::TableRef;

/// Outcome of a bounded value-count query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueFetch {
    Complete(ValueCounts),
    /// The column has more distinct values than the configured bound
    TooManyValues { limit: usize },
}

/// The four query shapes the comparator needs from a SQL engine.
///
/// Every method runs exactly one query. Implementations must surface query
/// failures as errors; the comparator never retries or skips on failure.
pub trait QueryBackend {
    /// Short engine name used in logs
    fn name(&self) -> &'static str;

    /// Column names in declaration order
    fn describe_columns(&self, table: &TableRef) -> Result<Vec<String>>;

    /// `COUNT(*)` honoring the table's filter
    fn count_rows(&self, table: &TableRef) -> Result<u64>;

    /// `COUNT(DISTINCT column)` honoring the table's filter. NULL is not counted.
    fn distinct_count(&self, table: &TableRef, column: &str) -> Result<u64>;

    /// Occurrences per distinct text-rendered value, NULL included.
    ///
    /// With `limit` set, at most `limit` distinct values are materialized;
    /// more than that yields [`ValueFetch::TooManyValues`].
    fn value_counts(&self, table: &TableRef, column: &str, limit: Option<usize>)
        -> Result<ValueFetch>;
}

/// Turn a grouped result into a [`ValueFetch`], enforcing the bound
pub(crate) fn bounded_fetch(counts: ValueCounts, limit: Option<usize>) -> ValueFetch {
    match limit {
        Some(limit) if counts.len() > limit => ValueFetch::TooManyValues { limit },
        _ => ValueFetch::Complete(counts),
    }
}
