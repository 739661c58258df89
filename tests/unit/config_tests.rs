//! Unit tests for configuration loading

use std::fs;
use tabcompare::config::{AppConfig, DEFAULT_CONFIG_FILE, DEFAULT_EXCLUDED_COLUMNS};
use tabcompare::CompareError;
use tempfile::TempDir;

#[test]
fn test_full_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(DEFAULT_CONFIG_FILE);
    fs::write(
        &path,
        r#"{
  "connection": {
    "user": "analyst",
    "account": "acme-eu",
    "warehouse": "COMPUTE_WH",
    "database": "/data/warehouse.duckdb",
    "read_only": true,
    "settings": ["SET threads = 2"],
    "attach": ["ATTACH 'dbname={warehouse}' AS src (TYPE postgres)"]
  },
  "comparison": {
    "table_a": "DB1.SCHEMA1.TABLE1",
    "table_b": "DB2.SCHEMA2.TABLE2",
    "filter_a": "LOAD_DATE >= '2024-01-01'",
    "excluded_columns": ["_FIVETRAN_SYNCED"],
    "checks": {"columns": true, "distinct_counts": true, "values": false},
    "max_distinct_values": 0
  }
}"#,
    )
    .unwrap();

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config.connection.user.as_deref(), Some("analyst"));
    assert!(config.connection.read_only);
    assert!(!config.connection.is_in_memory());
    assert_eq!(
        config.connection.resolved_attach().unwrap(),
        vec!["ATTACH 'dbname=COMPUTE_WH' AS src (TYPE postgres)".to_string()]
    );
    assert_eq!(config.comparison.filter_a.as_deref(), Some("LOAD_DATE >= '2024-01-01'"));
    assert!(config.comparison.checks.distinct_counts);
    assert!(!config.comparison.checks.values);
    assert_eq!(config.comparison.value_limit(), None);
    assert!(config.comparison.write_log_file);
}

#[test]
fn test_malformed_config_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let err = AppConfig::load(&path).unwrap_err();
    assert!(matches!(err, CompareError::Config { .. }));
    assert!(err.is_setup_error());
}

#[test]
fn test_explicit_missing_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.json");
    assert!(matches!(
        AppConfig::load_or_default(Some(&missing)),
        Err(CompareError::ConfigNotFound { .. })
    ));
}

#[test]
fn test_template_lists_pipeline_columns() {
    let template = AppConfig::template();
    for column in DEFAULT_EXCLUDED_COLUMNS {
        assert!(template.comparison.excluded_columns.iter().any(|c| c == column));
    }
    assert_eq!(template.comparison.excluded_columns.len(), DEFAULT_EXCLUDED_COLUMNS.len());
}
