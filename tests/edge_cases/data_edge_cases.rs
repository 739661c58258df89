//! Unusual data: NULLs, empty tables, odd column names

use tabcompare::backend::QueryBackend;
use tabcompare::config::Checks;
use tabcompare::diff::ValueKey;
use tabcompare::duckdb_backend::DuckDbBackend;
use tabcompare::memory::{MemoryBackend, MemoryTable};
use tabcompare::{ComparisonOptions, Finding, TableComparator, TableRef};

fn table(name: &str) -> TableRef {
    TableRef::parse(name).unwrap()
}

fn duckdb_backend(setup_sql: &str) -> DuckDbBackend {
    let connection = duckdb::Connection::open_in_memory().unwrap();
    connection.execute_batch(setup_sql).unwrap();
    DuckDbBackend::from_connection(connection)
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

#[test]
fn test_null_and_null_text_are_distinct_values() {
    let backend = duckdb_backend(
        r#"
CREATE TABLE a (note VARCHAR);
INSERT INTO a VALUES (NULL), (NULL);
CREATE TABLE b (note VARCHAR);
INSERT INTO b VALUES ('NULL'), ('NULL');
"#,
    );
    let report = TableComparator::new(&backend, table("a"), table("b"), all_checks())
        .run(&mut Vec::<Finding>::new())
        .unwrap();

    let diff = report.value_diff("note").unwrap();
    assert_eq!(diff.missing_in_b.iter().collect::<Vec<_>>(), vec![&ValueKey::Null]);
    assert_eq!(diff.missing_in_a.iter().collect::<Vec<_>>(), vec![&ValueKey::text("NULL")]);

    // COUNT(DISTINCT) ignores NULL on side A only
    assert!(report.findings.contains(&Finding::DistinctCount {
        column: "note".to_string(),
        count_a: 0,
        count_b: 1,
    }));
}

#[test]
fn test_empty_tables_match() {
    let backend = duckdb_backend(
        r#"
CREATE TABLE a (id INTEGER, name VARCHAR);
CREATE TABLE b (id INTEGER, name VARCHAR);
"#,
    );
    let report = TableComparator::new(&backend, table("a"), table("b"), all_checks())
        .run(&mut Vec::<Finding>::new())
        .unwrap();

    assert_eq!(report.row_counts(), Some((0, 0)));
    assert!(!report.has_mismatches());
    assert!(report.value_diff("id").unwrap().count_mismatches.is_empty());
}

#[test]
fn test_empty_against_populated() {
    let backend = MemoryBackend::new()
        .with_table("A", MemoryTable::new(["ID"]))
        .with_table("B", MemoryTable::new(["ID"]).row([Some("1")]).row([None::<&str>]));
    let report = TableComparator::new(&backend, table("A"), table("B"), ComparisonOptions::default())
        .run(&mut Vec::<Finding>::new())
        .unwrap();

    let diff = report.value_diff("ID").unwrap();
    assert!(diff.missing_in_b.is_empty());
    assert_eq!(diff.missing_in_a.len(), 2);
    assert_eq!(diff.total_differences(), 2);
}

#[test]
fn test_quoted_column_names() {
    let backend = duckdb_backend(
        r#"
CREATE TABLE a ("order id" INTEGER, "say ""hi""" VARCHAR, "select" VARCHAR);
INSERT INTO a VALUES (1, 'x', 'y'), (2, 'x', 'z');
CREATE TABLE b AS SELECT * FROM a;
"#,
    );
    let report = TableComparator::new(&backend, table("a"), table("b"), all_checks())
        .run(&mut Vec::<Finding>::new())
        .unwrap();

    assert_eq!(report.value_columns(), vec!["order id", "say \"hi\"", "select"]);
    assert!(!report.has_mismatches());
    assert!(report.findings.contains(&Finding::DistinctCount {
        column: "say \"hi\"".to_string(),
        count_a: 1,
        count_b: 1,
    }));
}

#[test]
fn test_column_names_are_case_sensitive() {
    let backend = MemoryBackend::new()
        .with_table("A", MemoryTable::new(["Id", "NAME"]))
        .with_table("B", MemoryTable::new(["ID", "NAME"]));
    let comparator = TableComparator::new(&backend, table("A"), table("B"), ComparisonOptions::default());

    let diff = comparator.diff_columns().unwrap();
    assert_eq!(diff.only_in_a, vec!["Id"]);
    assert_eq!(diff.only_in_b, vec!["ID"]);
    assert_eq!(diff.common, vec!["NAME"]);
}

#[test]
fn test_non_text_values_compare_as_text() {
    let backend = duckdb_backend(
        r#"
CREATE TABLE a (amount DECIMAL(10,2), seen DATE, ok BOOLEAN);
INSERT INTO a VALUES (1.50, DATE '2024-01-31', true), (2.00, NULL, false);
CREATE TABLE b (amount DECIMAL(10,2), seen DATE, ok BOOLEAN);
INSERT INTO b VALUES (1.50, DATE '2024-01-31', true), (2.01, NULL, false);
"#,
    );
    let report = TableComparator::new(&backend, table("a"), table("b"), ComparisonOptions::default())
        .run(&mut Vec::<Finding>::new())
        .unwrap();

    let amount = report.value_diff("amount").unwrap();
    assert_eq!(amount.missing_in_b.iter().collect::<Vec<_>>(), vec![&ValueKey::text("2.00")]);
    assert_eq!(amount.missing_in_a.iter().collect::<Vec<_>>(), vec![&ValueKey::text("2.01")]);
    assert!(!report.value_diff("seen").unwrap().has_differences());
    assert!(!report.value_diff("ok").unwrap().has_differences());
}

#[test]
fn test_every_column_excluded() {
    let backend = MemoryBackend::new()
        .with_table("A", MemoryTable::new(["_FILE"]).row([Some("f")]))
        .with_table("B", MemoryTable::new(["_FILE"]).row([Some("g")]));
    let options = ComparisonOptions {
        excluded_columns: vec!["_FILE".to_string()],
        ..all_checks()
    };
    let report = TableComparator::new(&backend, table("A"), table("B"), options)
        .run(&mut Vec::<Finding>::new())
        .unwrap();

    assert!(report.column_set().unwrap().common.is_empty());
    assert!(report.value_columns().is_empty());
    assert!(!report.has_mismatches());
    assert!(backend.queries().iter().all(|q| q.column().is_none()));
}

#[test]
fn test_single_part_and_qualified_names_resolve() {
    let backend = duckdb_backend("CREATE TABLE t AS SELECT 1 AS id;");
    assert_eq!(backend.count_rows(&table("t")).unwrap(), 1);
    assert_eq!(backend.count_rows(&table("main.t")).unwrap(), 1);
    assert_eq!(backend.count_rows(&table("memory.main.t")).unwrap(), 1);
}
