//! Error types for tabcompare operations

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompareError>;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Query failed: {source}\n  SQL: {sql}")]
    Query {
        sql: String,
        #[source]
        source: duckdb::Error,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Connection error: {message}")]
    Connection { message: String },

    #[error("Invalid table reference '{reference}': {message}")]
    InvalidTable { reference: String, message: String },

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl CompareError {
    pub fn query(sql: impl Into<String>, source: duckdb::Error) -> Self {
        Self::Query {
            sql: sql.into(),
            source,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection {
            message: msg.into(),
        }
    }

    pub fn invalid_table(reference: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidTable {
            reference: reference.into(),
            message: msg.into(),
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// Whether this error happened before any comparison step could run
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::ConfigNotFound { .. }
                | Self::Connection { .. }
                | Self::InvalidTable { .. }
                | Self::Json(_)
        )
    }
}
