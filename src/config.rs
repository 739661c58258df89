//! Configuration file (tabcompare.json) and connection placeholders

use crate::error::{CompareError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the current directory
pub const DEFAULT_CONFIG_FILE: &str = "tabcompare.json";

/// Pipeline-metadata columns written into new config templates
pub const DEFAULT_EXCLUDED_COLUMNS: &[&str] = &[
    "METADATA_FILENAME",
    "METADATA_FILE_ROW_NUMBER",
    "_DBT_COPIED_AT",
    "_FILE",
    "_FIVETRAN_SYNCED",
    "_LINE",
    "_MODIFIED",
];

/// Default bound on distinct values materialized per column and table
pub const DEFAULT_MAX_DISTINCT_VALUES: usize = 100_000;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub connection: ConnectionConfig,
    pub comparison: ComparisonConfig,
}

/// How to open the query engine.
///
/// `user`, `account` and `warehouse` are an opaque credential bundle; they are
/// only consumed as `{user}`, `{account}` and `{warehouse}` placeholders in
/// `attach` statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub user: Option<String>,
    pub account: Option<String>,
    pub warehouse: Option<String>,
    /// DuckDB database file, or `:memory:`
    pub database: String,
    pub read_only: bool,
    /// Statements run right after opening, e.g. `SET threads = 4`
    pub settings: Vec<String>,
    /// `ATTACH` statements for external databases
    pub attach: Vec<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            user: None,
            account: None,
            warehouse: None,
            database: ":memory:".to_string(),
            read_only: false,
            settings: Vec::new(),
            attach: Vec::new(),
        }
    }
}

impl ConnectionConfig {
    pub fn is_in_memory(&self) -> bool {
        self.database.trim().is_empty() || self.database == ":memory:"
    }

    /// Resolve placeholders in every `attach` statement
    pub fn resolved_attach(&self) -> Result<Vec<String>> {
        self.attach
            .iter()
            .map(|stmt| substitute_placeholders(stmt, |name| self.lookup(name)))
            .collect()
    }

    /// Credential bundle first, then the process environment
    fn lookup(&self, name: &str) -> Option<String> {
        let from_bundle = match name {
            "user" => self.user.clone(),
            "account" => self.account.clone(),
            "warehouse" => self.warehouse.clone(),
            _ => None,
        };
        from_bundle.or_else(|| env::var(name).ok())
    }
}

/// Which checks run after the row-count check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Checks {
    pub columns: bool,
    pub distinct_counts: bool,
    pub values: bool,
}

impl Default for Checks {
    fn default() -> Self {
        Self {
            columns: true,
            distinct_counts: false,
            values: true,
        }
    }
}

/// What to compare
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub table_a: Option<String>,
    pub table_b: Option<String>,
    pub filter_a: Option<String>,
    pub filter_b: Option<String>,
    pub excluded_columns: Vec<String>,
    pub checks: Checks,
    /// Sort common columns by name instead of table A's order
    pub sort_common: bool,
    /// 0 disables the bound
    pub max_distinct_values: usize,
    pub log_dir: Option<PathBuf>,
    pub write_log_file: bool,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            table_a: None,
            table_b: None,
            filter_a: None,
            filter_b: None,
            excluded_columns: Vec::new(),
            checks: Checks::default(),
            sort_common: false,
            max_distinct_values: DEFAULT_MAX_DISTINCT_VALUES,
            log_dir: None,
            write_log_file: true,
        }
    }
}

impl ComparisonConfig {
    pub fn value_limit(&self) -> Option<usize> {
        match self.max_distinct_values {
            0 => None,
            n => Some(n),
        }
    }
}

impl AppConfig {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CompareError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            CompareError::config(format!("Failed to parse '{}': {}", path.display(), e))
        })?;

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load the given file, or fall back to defaults when no file was named
    /// and the default one is absent
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    log::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Starter configuration written by `tabcompare init`
    pub fn template() -> Self {
        Self {
            connection: ConnectionConfig {
                user: Some("ANALYST".to_string()),
                database: "warehouse.duckdb".to_string(),
                ..ConnectionConfig::default()
            },
            comparison: ComparisonConfig {
                table_a: Some("DB1.SCHEMA1.TABLE1".to_string()),
                table_b: Some("DB2.SCHEMA2.TABLE2".to_string()),
                excluded_columns: DEFAULT_EXCLUDED_COLUMNS
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
                ..ComparisonConfig::default()
            },
        }
    }

    /// Write the template, refusing to overwrite unless forced
    pub fn write_template(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(CompareError::invalid_input(format!(
                "Config file already exists: {} (use --force to overwrite)",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, serde_json::to_string_pretty(&Self::template())?)?;
        log::info!("Wrote config template to {}", path.display());
        Ok(())
    }
}

/// Replace `{NAME}` placeholders using `lookup`; unknown names are an error
pub fn substitute_placeholders<F>(template: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = template.to_string();
    let mut start = 0;

    while let Some(open_pos) = result[start..].find('{') {
        let open_pos = start + open_pos;
        let Some(close_pos) = result[open_pos..].find('}') else {
            break;
        };
        let close_pos = open_pos + close_pos;
        let name = result[open_pos + 1..close_pos].to_string();

        let value = lookup(&name).ok_or_else(|| {
            CompareError::config(format!(
                "Placeholder '{{{}}}' is not set in the connection config or environment",
                name
            ))
        })?;

        result.replace_range(open_pos..=close_pos, &value);
        start = open_pos + value.len();
    }

    Ok(result)
}

/// Load a `.env` file from the current directory if there is one
pub fn load_env_file() -> Result<()> {
    if Path::new(".env").exists() {
        dotenvy::dotenv()
            .map_err(|e| CompareError::config(format!("Failed to load .env file: {}", e)))?;
    }
    Ok(())
}
