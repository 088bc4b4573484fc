//! Loading records from JSON.

use std::collections::HashSet;
use std::path::Path;

use campus_query::{Record, Value};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{DashboardError, Result};

/// Parses a JSON array of records.
///
/// Ids must be unique within the array.
pub fn records_from_json<R>(json: &str) -> Result<Vec<R>>
where
    R: Record + DeserializeOwned,
{
    let records: Vec<R> = serde_json::from_str(json)?;
    check_unique_ids(&records)?;
    Ok(records)
}

/// Reads a JSON file of records.
pub fn load_records<R>(path: impl AsRef<Path>) -> Result<Vec<R>>
where
    R: Record + DeserializeOwned,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| DashboardError::io(path, e))?;
    let records = records_from_json(&content)?;
    debug!(path = %path.display(), records = records.len(), "loaded records");
    Ok(records)
}

fn check_unique_ids<R: Record>(records: &[R]) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        let id = match record.field_value("id") {
            Value::None => continue,
            Value::String(s) => s.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Timestamp(t) => t.as_millis().to_string(),
        };
        if !seen.insert(id.clone()) {
            return Err(DashboardError::DuplicateId(id));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, Transaction};

    const TRANSACTIONS: &str = r#"[
        {"id": 1, "student": "John Smith", "description": "Tuition Fee", "category": "tuition",
         "status": "paid", "amount": 45000, "date": "2024-01-15"},
        {"id": 2, "student": "Emma Johnson", "description": "Library Fine", "category": "fines",
         "status": "pending", "amount": 25000, "date": "2024-01-16"}
    ]"#;

    #[test]
    fn parses_transactions() {
        let records: Vec<Transaction> = records_from_json(TRANSACTIONS).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].student, "Emma Johnson");
        assert_eq!(records[0].date.to_string(), "2024-01-15");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = TRANSACTIONS.replace(r#""id": 2"#, r#""id": 1"#);
        let err = records_from_json::<Transaction>(&json).unwrap_err();
        assert!(matches!(err, DashboardError::DuplicateId(ref id) if id == "1"));
    }

    #[test]
    fn bad_status_is_a_json_error() {
        let json = TRANSACTIONS.replace("pending", "lost");
        let err = records_from_json::<Transaction>(&json).unwrap_err();
        assert!(matches!(err, DashboardError::Json(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_records::<Course>("/nonexistent/courses.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/courses.json"));
    }
}
