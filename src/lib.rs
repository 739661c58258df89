//! # tabcompare
//!
//! Compare two database tables for data-engineering validation: row counts,
//! column sets, per-column distinct counts and per-column value multisets.
//!
//! The comparator runs against any [`backend::QueryBackend`]. The CLI uses
//! DuckDB, which can also reach external databases through `ATTACH`.

pub mod backend;
pub mod cli;
pub mod commands;
pub mod comparator;
pub mod config;
pub mod diff;
pub mod duckdb_backend;
pub mod error;
pub mod memory;
pub mod output;
pub mod progress;
pub mod report;
pub mod table;

pub use backend::{QueryBackend, ValueFetch};
pub use comparator::{ComparisonOptions, TableComparator};
pub use error::{CompareError, Result};
pub use report::{ComparisonReport, Finding};
pub use table::TableRef;
