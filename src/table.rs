//! Table references and identifier quoting

use crate::error::{CompareError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fully-qualified table name with an optional row filter.
///
/// Both the name and the filter are trusted input: they are spliced into
/// generated SQL as-is. Only column identifiers are quoted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    name: String,
    filter: Option<String>,
}

impl TableRef {
    /// Parse a `database.schema.table` reference (one to three parts)
    pub fn parse(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CompareError::invalid_table(name, "table name is empty"));
        }

        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.len() > 3 {
            return Err(CompareError::invalid_table(
                name,
                "expected at most three parts (database.schema.table)",
            ));
        }
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(CompareError::invalid_table(name, "empty name part"));
        }

        Ok(Self {
            name: trimmed.to_string(),
            filter: None,
        })
    }

    /// Attach a filter predicate; empty or blank text means no filter
    pub fn with_filter(mut self, filter: Option<&str>) -> Self {
        self.filter = filter
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// ` WHERE (<filter>)` or the empty string
    pub fn where_clause(&self) -> String {
        match &self.filter {
            Some(filter) => format!(" WHERE ({})", filter),
            None => String::new(),
        }
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filter {
            Some(filter) => write!(f, "{} [WHERE {}]", self.name, filter),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Quote a column identifier, doubling embedded quotes
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
