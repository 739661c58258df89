//! End-to-end comparison scenarios

use crate::common::sample_data;
use duckdb::Connection;
use tabcompare::config::Checks;
use tabcompare::diff::{CountMismatch, ValueKey};
use tabcompare::duckdb_backend::DuckDbBackend;
use tabcompare::memory::{MemoryBackend, MemoryTable, QueryRecord};
use tabcompare::{ComparisonOptions, Finding, TableComparator, TableRef};

fn table(name: &str) -> TableRef {
    TableRef::parse(name).unwrap()
}

fn all_checks() -> ComparisonOptions {
    ComparisonOptions {
        checks: Checks {
            columns: true,
            distinct_counts: true,
            values: true,
        },
        ..ComparisonOptions::default()
    }
}

fn duckdb_backend(setup_sql: &str) -> DuckDbBackend {
    let connection = Connection::open_in_memory().unwrap();
    connection.execute_batch(setup_sql).unwrap();
    DuckDbBackend::from_connection(connection)
}

#[test]
fn test_identical_tables_report_no_mismatches() {
    let backend = duckdb_backend(sample_data::IDENTICAL_TABLES_SQL);
    let mut comparator =
        TableComparator::new(&backend, table("memory.main.a"), table("memory.main.b"), all_checks());

    let mut sink: Vec<Finding> = Vec::new();
    let report = comparator.run(&mut sink).unwrap();

    assert_eq!(report.row_counts(), Some((100, 100)));
    let columns = report.column_set().unwrap();
    assert!(columns.only_in_a.is_empty());
    assert!(columns.only_in_b.is_empty());
    assert_eq!(columns.common, vec!["id", "name", "bucket", "flag", "amount"]);
    assert_eq!(report.value_columns(), vec!["id", "name", "bucket", "flag", "amount"]);
    assert_eq!(report.mismatch_count(), 0);
    assert!(!report.has_mismatches());
    assert_eq!(sink, report.findings);
}

#[test]
fn test_column_only_in_a_is_never_value_compared() {
    let a = MemoryTable::new(["ID", "X", "NAME"])
        .row([Some("1"), Some("x1"), Some("ann")])
        .row([Some("2"), Some("x2"), Some("bob")]);
    let b = MemoryTable::new(["ID", "NAME"])
        .row([Some("1"), Some("ann")])
        .row([Some("2"), Some("bob")]);
    let backend = MemoryBackend::new().with_table("DB.S.A", a).with_table("DB.S.B", b);

    let mut comparator = TableComparator::new(&backend, table("DB.S.A"), table("DB.S.B"), all_checks());
    let report = comparator.run(&mut Vec::<Finding>::new()).unwrap();

    let columns = report.column_set().unwrap();
    assert_eq!(columns.only_in_a, vec!["X".to_string()]);
    assert!(columns.only_in_b.is_empty());
    assert_eq!(columns.common, vec!["ID".to_string(), "NAME".to_string()]);

    assert!(backend.queries().iter().all(|q| q.column() != Some("X")));
    assert_eq!(report.value_columns(), vec!["ID", "NAME"]);
    // Only the column-set finding differs
    assert_eq!(report.mismatch_count(), 1);
}

#[test]
fn test_value_count_mismatch_for_shared_value() {
    let backend = sample_data::status_backend(10, 8);
    let mut comparator = TableComparator::new(
        &backend,
        table("DB.S.A"),
        table("DB.S.B"),
        ComparisonOptions::default(),
    );
    let report = comparator.run(&mut Vec::<Finding>::new()).unwrap();

    let status = report.value_diff("STATUS").unwrap();
    assert!(status.missing_in_a.is_empty());
    assert!(status.missing_in_b.is_empty());
    assert_eq!(
        status.count_mismatches,
        vec![CountMismatch {
            value: ValueKey::text("active"),
            count_a: 10,
            count_b: 8,
        }]
    );
}

#[test]
fn test_value_count_mismatch_with_duckdb() {
    let backend = duckdb_backend(sample_data::STATUS_TABLES_SQL);
    let mut comparator = TableComparator::new(
        &backend,
        table("memory.main.a"),
        table("memory.main.b"),
        ComparisonOptions::default(),
    );
    let report = comparator.run(&mut Vec::<Finding>::new()).unwrap();

    assert_eq!(report.row_counts(), Some((15, 13)));
    let status = report.value_diff("status").unwrap();
    assert_eq!(
        status.count_mismatches,
        vec![CountMismatch {
            value: ValueKey::text("active"),
            count_a: 10,
            count_b: 8,
        }]
    );
    assert!(status.missing_in_a.is_empty() && status.missing_in_b.is_empty());

    let ids = report.value_diff("id").unwrap();
    assert_eq!(
        ids.missing_in_b.iter().cloned().collect::<Vec<_>>(),
        vec![ValueKey::text("8"), ValueKey::text("9")]
    );
}

#[test]
fn test_filter_applies_to_one_table_only() {
    let a = MemoryTable::new(["ID", "STATUS"])
        .repeat_row(6, &[Some("1"), Some("active")])
        .repeat_row(4, &[Some("2"), Some("closed")]);
    let b = MemoryTable::new(["ID", "STATUS"]).repeat_row(6, &[Some("1"), Some("active")]);
    let backend = MemoryBackend::new()
        .with_table("DB.S.A", a)
        .with_table("DB.S.B", b)
        .with_filter("STATUS = 'active'", |row| row.get("STATUS") == Some("active"));

    // Unfiltered A differs from B
    let mut unfiltered =
        TableComparator::new(&backend, table("DB.S.A"), table("DB.S.B"), ComparisonOptions::default());
    let report = unfiltered.run(&mut Vec::<Finding>::new()).unwrap();
    assert_eq!(report.row_counts(), Some((10, 6)));
    assert!(report.has_mismatches());

    // Filtered A matches the full B
    let filtered_a = table("DB.S.A").with_filter(Some("STATUS = 'active'"));
    let mut filtered =
        TableComparator::new(&backend, filtered_a, table("DB.S.B"), ComparisonOptions::default());
    let report = filtered.run(&mut Vec::<Finding>::new()).unwrap();
    assert_eq!(report.row_counts(), Some((6, 6)));
    assert!(report.value_diff("STATUS").unwrap().count_mismatches.is_empty());
    assert!(!report.has_mismatches());

    assert!(backend
        .queries()
        .contains(&QueryRecord::CountRows { table: "DB.S.B".to_string() }));
}

#[test]
fn test_filter_with_duckdb() {
    let backend = duckdb_backend(sample_data::STATUS_TABLES_SQL);
    let a = table("memory.main.a").with_filter(Some("id < 8 OR status = 'closed'"));
    let mut comparator =
        TableComparator::new(&backend, a, table("memory.main.b"), all_checks());
    let report = comparator.run(&mut Vec::<Finding>::new()).unwrap();

    assert_eq!(report.row_counts(), Some((13, 13)));
    assert_eq!(report.mismatch_count(), 0);
    assert!(report.findings.iter().any(|f| matches!(
        f,
        Finding::DistinctCount { column, count_a: 13, count_b: 13 } if column == "id"
    )));
}
