//! DuckDB implementation of the query backend

use crate::backend::{bounded_fetch, QueryBackend, ValueFetch};
use crate::config::ConnectionConfig;
use crate::diff::{ValueCounts, ValueKey};
use crate::error::{CompareError, Result};
use crate::table::{quote_ident, TableRef};
use duckdb::{AccessMode, Config, Connection};

/// One DuckDB connection serving every query of a run.
///
/// The connection is released when the backend is dropped, so an error
/// anywhere in a run still closes it.
pub struct DuckDbBackend {
    connection: Connection,
}

impl DuckDbBackend {
    /// Open the configured database, apply settings and attach external sources
    pub fn open(config: &ConnectionConfig) -> Result<Self> {
        let connection = if config.is_in_memory() {
            Connection::open_in_memory()
        } else if config.read_only {
            let flags = Config::default().access_mode(AccessMode::ReadOnly)?;
            Connection::open_with_flags(&config.database, flags)
        } else {
            Connection::open(&config.database)
        }
        .map_err(|e| {
            CompareError::connection(format!(
                "Failed to open database '{}': {}",
                config.database, e
            ))
        })?;

        if let Some(user) = &config.user {
            log::info!("Connecting as {}", user);
        }
        log::info!(
            "Opened DuckDB database: {}",
            if config.is_in_memory() { ":memory:" } else { &config.database }
        );

        for setting in &config.settings {
            log::debug!("Applying setting: {}", setting);
            connection.execute_batch(setting).map_err(|e| {
                CompareError::connection(format!("Setting '{}' failed: {}", setting, e))
            })?;
        }

        let attach = config.resolved_attach()?;
        for (template, statement) in config.attach.iter().zip(&attach) {
            // Resolved statements may carry secrets; log the template only
            log::debug!("Attaching: {}", template);
            connection.execute_batch(statement).map_err(|e| {
                CompareError::connection(format!("Attach '{}' failed: {}", template, e))
            })?;
        }

        Ok(Self { connection })
    }

    /// Wrap an already-open connection
    pub fn from_connection(connection: Connection) -> Self {
        Self { connection }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Close explicitly, surfacing any error from the engine
    pub fn close(self) -> Result<()> {
        self.connection
            .close()
            .map_err(|(_, e)| CompareError::connection(format!("Failed to close connection: {}", e)))?;
        log::info!("Closed DuckDB connection");
        Ok(())
    }

    fn query_count(&self, sql: &str) -> Result<u64> {
        log::debug!("SQL: {}", sql);
        let count: i64 = self
            .connection
            .prepare(sql)
            .and_then(|mut stmt| stmt.query_row([], |row| row.get(0)))
            .map_err(|e| CompareError::query(sql, e))?;

        u64::try_from(count)
            .map_err(|_| CompareError::backend(format!("Negative count {} from: {}", count, sql)))
    }
}

impl QueryBackend for DuckDbBackend {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn describe_columns(&self, table: &TableRef) -> Result<Vec<String>> {
        let sql = format!("DESCRIBE {}", table.name());
        log::debug!("SQL: {}", sql);

        let mut stmt = self
            .connection
            .prepare(&sql)
            .map_err(|e| CompareError::query(&sql, e))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| CompareError::query(&sql, e))?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row.map_err(|e| CompareError::query(&sql, e))?);
        }
        Ok(columns)
    }

    fn count_rows(&self, table: &TableRef) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}{}", table.name(), table.where_clause());
        self.query_count(&sql)
    }

    fn distinct_count(&self, table: &TableRef, column: &str) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(DISTINCT {}) FROM {}{}",
            quote_ident(column),
            table.name(),
            table.where_clause()
        );
        self.query_count(&sql)
    }

    fn value_counts(
        &self,
        table: &TableRef,
        column: &str,
        limit: Option<usize>,
    ) -> Result<ValueFetch> {
        // One row past the bound is enough to know it was exceeded
        let limit_clause = match limit {
            Some(limit) => format!(" LIMIT {}", limit.saturating_add(1)),
            None => String::new(),
        };
        let sql = format!(
            "SELECT CAST({} AS VARCHAR) AS value, COUNT(*) AS occurrences FROM {}{} GROUP BY 1{}",
            quote_ident(column),
            table.name(),
            table.where_clause(),
            limit_clause
        );
        log::debug!("SQL: {}", sql);

        let mut stmt = self
            .connection
            .prepare(&sql)
            .map_err(|e| CompareError::query(&sql, e))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(|e| CompareError::query(&sql, e))?;

        let mut counts = ValueCounts::new();
        for row in rows {
            let (value, occurrences) = row.map_err(|e| CompareError::query(&sql, e))?;
            counts.insert(ValueKey::from(value), occurrences.max(0) as u64);
        }

        Ok(bounded_fetch(counts, limit))
    }
}
