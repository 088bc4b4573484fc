//! Error types for the dashboard.

use std::path::PathBuf;

use campus_query::{FieldType, QueryError};
use thiserror::Error;

use crate::screen::Screen;

/// Errors from loading, configuring and rendering dashboard screens.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// A query failed to validate or run.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// A screen's configuration does not fit its record schema.
    #[error("invalid {screen} screen configuration: {source}")]
    InvalidConfig {
        screen: Screen,
        #[source]
        source: QueryError,
    },

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV output failed: {0}")]
    Csv(#[from] csv::Error),

    /// Config files must be YAML or JSON.
    #[error("unsupported config format '{}': expected .yaml, .yml or .json", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// A `--min`/`--max` value could not be read as the field's type.
    #[error("invalid {expected} bound '{value}' for field '{field}'")]
    InvalidBound {
        field: String,
        value: String,
        expected: FieldType,
    },

    /// A `FIELD=VALUE` argument without the `=`.
    #[error("expected FIELD=VALUE, got '{0}'")]
    InvalidAssignment(String),

    /// Two records share an id.
    #[error("duplicate record id {0}")]
    DuplicateId(String),
}

impl DashboardError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DashboardError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;
