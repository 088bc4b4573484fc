//! Loading dashboard configs and records from disk.

use std::fs;

use campus_dashboard::{load_records, DashboardConfig, DashboardError, Screen, Transaction};
use campus_query::{QueryError, SortSpec};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn yaml_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "dashboard.yaml",
        r#"
screens:
  finance:
    page_size: 5
    default_sort: { field: amount, dir: desc }
    summaries:
      - name: total
        field: amount
      - name: large
        kind: count
        when: { kind: range, field: amount, min: { number: 10000 } }
"#,
    );

    let config = DashboardConfig::load(&path).unwrap();
    let finance = config.screen(Screen::Finance);
    assert_eq!(finance.page_size, 5);
    assert_eq!(finance.default_sort, Some(SortSpec::desc("amount")));
    assert_eq!(finance.summaries.len(), 2);
    assert_eq!(
        config.screen(Screen::Departments),
        &Screen::Departments.default_config()
    );
}

#[test]
fn json_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "dashboard.json",
        r#"{"screens": {"courses": {"search_fields": ["title"], "columns": ["code", "title"]}}}"#,
    );

    let config = DashboardConfig::load(&path).unwrap();
    let courses = config.screen(Screen::Courses);
    assert_eq!(courses.search_fields, vec!["title"]);
    assert_eq!(courses.columns, vec!["code", "title"]);
}

#[test]
fn config_errors_name_the_screen() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "dashboard.yml",
        "screens:\n  departments:\n    summaries:\n      - {name: heads, field: head}\n",
    );

    let err = DashboardConfig::load(&path).unwrap_err();
    assert!(matches!(
        err,
        DashboardError::InvalidConfig {
            screen: Screen::Departments,
            ..
        }
    ));
    assert!(err.to_string().starts_with("invalid departments screen configuration"));
}

#[test]
fn repeated_summary_names_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "dashboard.yaml",
        "screens:\n  finance:\n    summaries:\n      - {name: total, field: amount}\n      - {name: total, kind: count}\n",
    );

    let err = DashboardConfig::load(&path).unwrap_err();
    assert!(matches!(
        err,
        DashboardError::InvalidConfig {
            screen: Screen::Finance,
            source: QueryError::DuplicateAggregation { ref name },
        } if name == "total"
    ));
}

#[test]
fn missing_config_file() {
    let dir = TempDir::new().unwrap();
    let err = DashboardConfig::load(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, DashboardError::Io { .. }));
}

#[test]
fn records_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "transactions.json",
        r#"[{"id": 1, "student": "Ada Lovelace", "description": "Tuition Fee",
             "category": "tuition", "status": "paid", "amount": 45000, "date": "2024-01-15"}]"#,
    );

    let records: Vec<Transaction> = load_records(&path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].amount, 45000.0);

    let bad = write(&dir, "bad.json", r#"[{"id": 1}]"#);
    assert!(matches!(
        load_records::<Transaction>(&bad),
        Err(DashboardError::Json(_))
    ));
}
