//! Screen definitions and their UI controls.
//!
//! A [`ScreenConfig`] says how a table behaves (page size, searchable
//! columns, default order, summary cards). A [`ScreenQuery`] holds what the
//! user has typed or selected. [`ScreenConfig::query`] combines the two into
//! a [`TableQuery`].

use std::collections::BTreeMap;
use std::fmt;

use campus_query::{
    Aggregation, FieldType, PageRequest, Predicate, QueryError, RecordSchema, Scalar, Schema,
    SortSpec, SummarySpec, TableQuery,
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::models::{Course, Date, Department, Transaction};

/// The dashboard's tabular screens.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    /// Fee transactions.
    Finance,
    Courses,
    Departments,
}

impl Screen {
    pub const ALL: [Screen; 3] = [Screen::Finance, Screen::Courses, Screen::Departments];

    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Finance => "finance",
            Screen::Courses => "courses",
            Screen::Departments => "departments",
        }
    }

    /// Declared fields of the screen's records.
    pub fn schema(self) -> Schema {
        match self {
            Screen::Finance => Transaction::schema(),
            Screen::Courses => Course::schema(),
            Screen::Departments => Department::schema(),
        }
    }

    /// The built-in configuration of this screen.
    pub fn default_config(self) -> ScreenConfig {
        match self {
            Screen::Finance => ScreenConfig {
                page_size: 10,
                search_fields: strings(&[Transaction::STUDENT, Transaction::DESCRIPTION]),
                default_sort: Some(SortSpec::desc(Transaction::DATE)),
                summaries: SummarySpec::new()
                    .total("total", Transaction::AMOUNT)
                    .with(status_total("paid"))
                    .with(status_total("pending"))
                    .with(status_total("overdue")),
                columns: Vec::new(),
            },
            Screen::Courses => ScreenConfig {
                page_size: 8,
                search_fields: strings(&[Course::CODE, Course::TITLE, Course::INSTRUCTOR]),
                default_sort: Some(SortSpec::asc(Course::CODE)),
                summaries: SummarySpec::new()
                    .with(Aggregation::count("courses"))
                    .with(
                        Aggregation::count("active")
                            .when(Predicate::equals(Course::STATUS, "active")),
                    )
                    .total("enrolled", Course::ENROLLED)
                    .total("capacity", Course::CAPACITY),
                columns: Vec::new(),
            },
            Screen::Departments => ScreenConfig {
                page_size: 6,
                search_fields: strings(&[Department::NAME, Department::CODE, Department::HEAD]),
                default_sort: Some(SortSpec::asc(Department::NAME)),
                summaries: SummarySpec::new()
                    .with(Aggregation::count("departments"))
                    .total("faculty", Department::FACULTY)
                    .total("students", Department::STUDENTS)
                    .total("budget", Department::BUDGET),
                columns: Vec::new(),
            },
        }
    }
}

fn strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn status_total(status: &str) -> Aggregation {
    Aggregation::sum(status, Transaction::AMOUNT)
        .when(Predicate::equals(Transaction::STATUS, status))
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How one table screen behaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreenConfig {
    /// Rows per page.
    pub page_size: usize,
    /// Columns the search box looks in. Empty disables search.
    #[serde(default)]
    pub search_fields: Vec<String>,
    /// Order used until the user picks a column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sort: Option<SortSpec>,
    /// Summary cards, in display order.
    #[serde(default)]
    pub summaries: SummarySpec,
    /// Table columns. Empty shows every declared field.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
}

impl ScreenConfig {
    /// Checks the configuration against the screen's schema.
    pub fn validate(&self, schema: &Schema) -> std::result::Result<(), QueryError> {
        PageRequest::first(self.page_size).validate()?;
        if !self.search_fields.is_empty() {
            Predicate::search(&self.search_fields, "").validate(schema)?;
        }
        if let Some(sort) = &self.default_sort {
            sort.validate(schema)?;
        }
        self.summaries.validate(schema)?;
        for column in &self.columns {
            schema.require(column)?;
        }
        Ok(())
    }

    /// The columns to display, in order.
    pub fn columns<'a>(&'a self, schema: &'a Schema) -> Vec<&'a str> {
        if self.columns.is_empty() {
            schema.names()
        } else {
            self.columns.iter().map(String::as_str).collect()
        }
    }

    /// Builds the table query for the current state of the controls.
    pub fn query(&self, controls: &ScreenQuery) -> TableQuery {
        let mut query = TableQuery::new();

        if !self.search_fields.is_empty() {
            let term = controls.search.clone().unwrap_or_default();
            query = query.search(&self.search_fields, term);
        }
        for (field, values) in &controls.filters {
            query = query.one_of(field, values);
        }
        for (field, bounds) in &controls.ranges {
            query = query.range(field, bounds.min.clone(), bounds.max.clone());
        }

        query.sort = controls.sort.clone().or_else(|| self.default_sort.clone());
        query.summary = self.summaries.clone();
        query.page(self.page_size, controls.page.unwrap_or(1))
    }
}

/// Inclusive bounds of a range control.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Scalar>,
}

/// The state of a screen's controls.
///
/// Each control maps to one predicate; changing a control replaces only its
/// own predicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenQuery {
    /// Text in the search box.
    pub search: Option<String>,
    /// Select controls: field to allowed values.
    pub filters: BTreeMap<String, Vec<String>>,
    /// Range controls: field to bounds.
    pub ranges: BTreeMap<String, Bounds>,
    /// A clicked column header.
    pub sort: Option<SortSpec>,
    /// 1-based page number.
    pub page: Option<usize>,
}

impl ScreenQuery {
    pub fn new() -> Self {
        ScreenQuery::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Adds values to a select control.
    pub fn filter<I, S>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters
            .entry(field.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn min(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.ranges.entry(field.into()).or_default().min = Some(value.into());
        self
    }

    pub fn max(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.ranges.entry(field.into()).or_default().max = Some(value.into());
        self
    }

    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }
}

/// Splits `FIELD=VALUE` at the first `=`.
pub fn parse_assignment(arg: &str) -> Result<(&str, &str)> {
    match arg.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok((field.trim(), value.trim())),
        _ => Err(DashboardError::InvalidAssignment(arg.to_string())),
    }
}

/// Parses `FIELD=V1,V2` into a select control's field and values.
pub fn parse_filter(arg: &str) -> Result<(&str, Vec<&str>)> {
    let (field, values) = parse_assignment(arg)?;
    let values = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();
    Ok((field, values))
}

/// Parses `FIELD=VALUE` into a range bound typed after the field.
///
/// Numbers accept integers and decimals. Timestamps accept `YYYY-MM-DD`.
pub fn parse_bound<'a>(schema: &Schema, arg: &'a str) -> Result<(&'a str, Scalar)> {
    let (field, value) = parse_assignment(arg)?;
    let field_type = schema.require(field)?;
    let invalid = || DashboardError::InvalidBound {
        field: field.to_string(),
        value: value.to_string(),
        expected: field_type,
    };

    let scalar = match field_type {
        FieldType::Number => match value.parse::<i64>() {
            Ok(n) => Scalar::from(n),
            Err(_) => Scalar::from(value.parse::<f64>().map_err(|_| invalid())?),
        },
        FieldType::Timestamp => {
            Scalar::from(value.parse::<Date>().map_err(|_| invalid())?.timestamp())
        }
        FieldType::Text | FieldType::Enum => return Err(invalid()),
    };
    Ok((field, scalar))
}
