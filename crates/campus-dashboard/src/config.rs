//! Dashboard configuration files.
//!
//! A config file overrides parts of the built-in screen definitions:
//!
//! ```yaml
//! screens:
//!   finance:
//!     page_size: 25
//!     default_sort: { field: amount, dir: desc }
//!   courses:
//!     search_fields: [title]
//! ```
//!
//! Screens and settings the file leaves out keep their defaults. Every
//! screen is validated against its schema when the file is loaded.

use std::collections::BTreeMap;
use std::path::Path;

use campus_query::{SortSpec, SummarySpec};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DashboardError, Result};
use crate::screen::{Screen, ScreenConfig};

/// Settings a config file may override for one screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreenOverrides {
    pub page_size: Option<usize>,
    pub search_fields: Option<Vec<String>>,
    pub default_sort: Option<SortSpec>,
    pub summaries: Option<SummarySpec>,
    pub columns: Option<Vec<String>>,
}

impl ScreenOverrides {
    fn apply(self, mut config: ScreenConfig) -> ScreenConfig {
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(fields) = self.search_fields {
            config.search_fields = fields;
        }
        if let Some(sort) = self.default_sort {
            config.default_sort = Some(sort);
        }
        if let Some(summaries) = self.summaries {
            config.summaries = summaries;
        }
        if let Some(columns) = self.columns {
            config.columns = columns;
        }
        config
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    screens: BTreeMap<Screen, ScreenOverrides>,
}

/// Configuration of every dashboard screen.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    finance: ScreenConfig,
    courses: ScreenConfig,
    departments: ScreenConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            finance: Screen::Finance.default_config(),
            courses: Screen::Courses.default_config(),
            departments: Screen::Departments.default_config(),
        }
    }
}

impl DashboardConfig {
    /// Parses a YAML config.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(yaml)?;
        DashboardConfig::from_file(file)
    }

    /// Parses a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(json)?;
        DashboardConfig::from_file(file)
    }

    /// Loads a config file, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self> = match extension.as_deref() {
            Some("yaml" | "yml") => DashboardConfig::from_yaml_str,
            Some("json") => DashboardConfig::from_json_str,
            _ => {
                return Err(DashboardError::UnsupportedFormat {
                    path: path.to_path_buf(),
                })
            }
        };
        let content =
            std::fs::read_to_string(path).map_err(|e| DashboardError::io(path, e))?;
        debug!(path = %path.display(), "loading dashboard config");
        parse(&content)
    }

    fn from_file(file: ConfigFile) -> Result<Self> {
        let mut config = DashboardConfig::default();
        for (screen, overrides) in file.screens {
            let slot = config.screen_mut(screen);
            *slot = overrides.apply(slot.clone());
        }
        for screen in Screen::ALL {
            config
                .screen(screen)
                .validate(&screen.schema())
                .map_err(|source| DashboardError::InvalidConfig { screen, source })?;
        }
        Ok(config)
    }

    /// The configuration of one screen.
    pub fn screen(&self, screen: Screen) -> &ScreenConfig {
        match screen {
            Screen::Finance => &self.finance,
            Screen::Courses => &self.courses,
            Screen::Departments => &self.departments,
        }
    }

    fn screen_mut(&mut self, screen: Screen) -> &mut ScreenConfig {
        match screen {
            Screen::Finance => &mut self.finance,
            Screen::Courses => &mut self.courses,
            Screen::Departments => &mut self.departments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_query::QueryError;

    #[test]
    fn empty_file_is_all_defaults() {
        let config = DashboardConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
    }

    #[test]
    fn overrides_merge_onto_defaults() {
        let config = DashboardConfig::from_yaml_str(
            "screens:\n  finance:\n    page_size: 25\n    default_sort: {field: amount, dir: desc}\n",
        )
        .unwrap();
        let finance = config.screen(Screen::Finance);
        assert_eq!(finance.page_size, 25);
        assert_eq!(finance.default_sort, Some(SortSpec::desc("amount")));
        // untouched settings keep their defaults
        assert_eq!(
            finance.search_fields,
            Screen::Finance.default_config().search_fields
        );
        assert_eq!(config.screen(Screen::Courses), &Screen::Courses.default_config());
    }

    #[test]
    fn json_config() {
        let config = DashboardConfig::from_json_str(
            r#"{"screens": {"departments": {"columns": ["name", "budget"]}}}"#,
        )
        .unwrap();
        assert_eq!(config.screen(Screen::Departments).columns, vec!["name", "budget"]);
    }

    #[test]
    fn invalid_screen_fails_at_load() {
        let err = DashboardConfig::from_yaml_str(
            "screens:\n  courses:\n    default_sort: {field: grade}\n",
        )
        .unwrap_err();
        match err {
            DashboardError::InvalidConfig { screen, source } => {
                assert_eq!(screen, Screen::Courses);
                assert_eq!(
                    source,
                    QueryError::UnknownField {
                        field: "grade".into()
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(DashboardConfig::from_yaml_str("screens:\n  finance:\n    pagesize: 5\n").is_err());
        assert!(DashboardConfig::from_yaml_str("screens:\n  library: {}\n").is_err());
    }

    #[test]
    fn unsupported_extension() {
        let err = DashboardConfig::load("dashboard.toml").unwrap_err();
        assert!(matches!(err, DashboardError::UnsupportedFormat { .. }));
    }
}
