//! Error types for the query pipeline.
//!
//! Errors fall in two groups. Configuration errors mean the specs don't fit
//! the schema (unknown field, wrong predicate for a field type, zero page
//! size). Data errors mean a record holds a value that disagrees with its
//! declared field type.

use thiserror::Error;

use crate::schema::FieldType;

/// Errors that can occur when validating specs or running the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// A spec references a field the schema does not declare.
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    /// Predicate kind cannot be applied to the declared field type.
    #[error("{predicate} predicate is not supported on {field_type} field '{field}'")]
    PredicateNotSupported {
        predicate: &'static str,
        field: String,
        field_type: FieldType,
    },

    /// A range bound's type differs from the field's declared type.
    #[error("range bound for '{field}' must be a {expected}, got {actual}")]
    BoundTypeMismatch {
        field: String,
        expected: FieldType,
        actual: &'static str,
    },

    /// A search predicate lists no fields to search.
    #[error("search predicate names no fields")]
    EmptySearch,

    /// A sum aggregation has no field to sum.
    #[error("aggregation '{name}' sums no field")]
    MissingSumField { name: String },

    /// A sum aggregation targets a field that is not declared numeric.
    #[error("aggregation '{name}' sums field '{field}' declared as {field_type}, expected number")]
    NotNumeric {
        name: String,
        field: String,
        field_type: FieldType,
    },

    /// Two aggregations in one summary share a name.
    #[error("aggregation '{name}' is listed more than once")]
    DuplicateAggregation { name: String },

    /// Page size must be at least 1.
    #[error("page size must be positive")]
    InvalidPageSize,

    /// A sort expression could not be parsed.
    #[error("invalid sort '{0}': expected FIELD or FIELD:asc|desc")]
    InvalidSort(String),

    /// A record value disagrees with the field's declared type.
    #[error("field '{field}' is declared {expected} but holds a {actual} value")]
    FieldTypeMismatch {
        field: String,
        expected: FieldType,
        actual: &'static str,
    },

    /// A summed field held something other than a number.
    #[error("aggregation '{name}' found a non-numeric {actual} value in field '{field}'")]
    NonNumericValue {
        name: String,
        field: String,
        actual: &'static str,
    },
}

impl QueryError {
    /// Returns `true` for errors caused by the specs rather than the records.
    pub fn is_config_error(&self) -> bool {
        !matches!(
            self,
            QueryError::FieldTypeMismatch { .. } | QueryError::NonNumericValue { .. }
        )
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_and_data_errors_are_distinguished() {
        let unknown = QueryError::UnknownField {
            field: "grade".into(),
        };
        assert!(unknown.is_config_error());

        let mismatch = QueryError::FieldTypeMismatch {
            field: "amount".into(),
            expected: FieldType::Number,
            actual: "string",
        };
        assert!(!mismatch.is_config_error());
    }

    #[test]
    fn messages_name_the_field() {
        let err = QueryError::NotNumeric {
            name: "total".into(),
            field: "status".into(),
            field_type: FieldType::Enum,
        };
        assert_eq!(
            err.to_string(),
            "aggregation 'total' sums field 'status' declared as enum, expected number"
        );
    }
}
