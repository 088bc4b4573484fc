//! Filter predicates.
//!
//! A [`Predicate`] is one tagged filter condition: a case-insensitive text
//! search over one or more fields, membership of an enum field in a set of
//! values, or an inclusive range over a numeric or timestamp field.
//!
//! A predicate with nothing to test (empty search term, empty value set,
//! no bounds) is *inactive* and is skipped rather than failed.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};
use crate::record::Record;
use crate::schema::{FieldType, Schema};
use crate::value::{Scalar, Value};

/// A single filter predicate.
///
/// # Example
///
/// ```
/// use campus_query::Predicate;
///
/// let search = Predicate::search(["student", "description"], "tuition");
/// let status = Predicate::one_of("status", ["pending", "overdue"]);
/// let amount = Predicate::at_least("amount", 1000);
///
/// assert!(search.is_active());
/// assert!(!Predicate::search(["student"], "").is_active());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    /// Case-insensitive substring match against any of `fields`.
    Search {
        fields: Vec<String>,
        #[serde(default)]
        term: Option<String>,
    },
    /// Exact match of an enum or text field against any of `values`.
    OneOf {
        field: String,
        #[serde(default)]
        values: Vec<String>,
    },
    /// Inclusive range over a number or timestamp field.
    Range {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<Scalar>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<Scalar>,
    },
}

impl Predicate {
    /// Creates a search predicate over the given fields.
    pub fn search<I, S>(fields: I, term: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::Search {
            fields: fields.into_iter().map(Into::into).collect(),
            term: Some(term.into()),
        }
    }

    /// Creates a set-membership predicate.
    pub fn one_of<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::OneOf {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates an equality predicate (a one-element set).
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Predicate::one_of(field, [value.into()])
    }

    /// Creates a range predicate with both bounds.
    pub fn between(
        field: impl Into<String>,
        min: impl Into<Scalar>,
        max: impl Into<Scalar>,
    ) -> Self {
        Predicate::Range {
            field: field.into(),
            min: Some(min.into()),
            max: Some(max.into()),
        }
    }

    /// Creates a range predicate with only a lower bound.
    pub fn at_least(field: impl Into<String>, min: impl Into<Scalar>) -> Self {
        Predicate::Range {
            field: field.into(),
            min: Some(min.into()),
            max: None,
        }
    }

    /// Creates a range predicate with only an upper bound.
    pub fn at_most(field: impl Into<String>, max: impl Into<Scalar>) -> Self {
        Predicate::Range {
            field: field.into(),
            min: None,
            max: Some(max.into()),
        }
    }

    /// Returns the display name of this predicate kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Predicate::Search { .. } => "search",
            Predicate::OneOf { .. } => "one_of",
            Predicate::Range { .. } => "range",
        }
    }

    /// Returns `true` if this predicate constrains anything.
    pub fn is_active(&self) -> bool {
        match self {
            Predicate::Search { term, .. } => term.as_deref().is_some_and(|t| !t.is_empty()),
            Predicate::OneOf { values, .. } => !values.is_empty(),
            Predicate::Range { min, max, .. } => min.is_some() || max.is_some(),
        }
    }

    /// Returns the fields this predicate reads.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Predicate::Search { fields, .. } => fields.iter().map(String::as_str).collect(),
            Predicate::OneOf { field, .. } | Predicate::Range { field, .. } => vec![field.as_str()],
        }
    }

    /// Checks this predicate against a schema.
    ///
    /// Inactive predicates are validated too: a misconfigured control must
    /// fail loudly even before the user types into it.
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        match self {
            Predicate::Search { fields, .. } => {
                if fields.is_empty() {
                    return Err(QueryError::EmptySearch);
                }
                for field in fields {
                    require_textual(self.kind(), field, schema)?;
                }
                Ok(())
            }
            Predicate::OneOf { field, .. } => require_textual(self.kind(), field, schema),
            Predicate::Range { field, min, max } => {
                let field_type = schema.require(field)?;
                if !field_type.is_ordinal() {
                    return Err(QueryError::PredicateNotSupported {
                        predicate: self.kind(),
                        field: field.clone(),
                        field_type,
                    });
                }
                for bound in min.iter().chain(max.iter()) {
                    if !field_type.accepts(&bound.as_value()) {
                        return Err(QueryError::BoundTypeMismatch {
                            field: field.clone(),
                            expected: field_type,
                            actual: bound.type_name(),
                        });
                    }
                }
                Ok(())
            }
        }
    }

    /// Evaluates this predicate against one record.
    ///
    /// The predicate must already be validated against `schema`. Inactive
    /// predicates match everything.
    pub fn matches<R: Record + ?Sized>(&self, record: &R, schema: &Schema) -> Result<bool> {
        Matcher::compile(self, schema)?.matches(record)
    }
}

fn require_textual(predicate: &'static str, field: &str, schema: &Schema) -> Result<()> {
    let field_type = schema.require(field)?;
    if field_type.is_textual() {
        Ok(())
    } else {
        Err(QueryError::PredicateNotSupported {
            predicate,
            field: field.to_string(),
            field_type,
        })
    }
}

/// A validated predicate prepared for evaluation over many records.
///
/// Search terms are lowercased once here instead of once per record.
#[derive(Debug)]
pub(crate) enum Matcher<'p> {
    Always,
    Search {
        fields: Vec<(&'p str, FieldType)>,
        needle: String,
    },
    OneOf {
        field: &'p str,
        field_type: FieldType,
        values: &'p [String],
    },
    Range {
        field: &'p str,
        field_type: FieldType,
        min: Option<Value<'p>>,
        max: Option<Value<'p>>,
    },
}

impl<'p> Matcher<'p> {
    /// Validates and prepares a predicate.
    pub(crate) fn compile(predicate: &'p Predicate, schema: &Schema) -> Result<Self> {
        predicate.validate(schema)?;
        if !predicate.is_active() {
            return Ok(Matcher::Always);
        }

        Ok(match predicate {
            Predicate::Search { fields, term } => Matcher::Search {
                fields: fields
                    .iter()
                    .map(|f| schema.require(f).map(|ty| (f.as_str(), ty)))
                    .collect::<Result<_>>()?,
                needle: term.as_deref().unwrap_or_default().to_lowercase(),
            },
            Predicate::OneOf { field, values } => Matcher::OneOf {
                field,
                field_type: schema.require(field)?,
                values,
            },
            Predicate::Range { field, min, max } => Matcher::Range {
                field,
                field_type: schema.require(field)?,
                min: min.as_ref().map(Scalar::as_value),
                max: max.as_ref().map(Scalar::as_value),
            },
        })
    }

    pub(crate) fn is_always(&self) -> bool {
        matches!(self, Matcher::Always)
    }

    pub(crate) fn matches<R: Record + ?Sized>(&self, record: &R) -> Result<bool> {
        match self {
            Matcher::Always => Ok(true),

            // Any field containing the needle is enough; absent fields
            // simply contribute no match.
            Matcher::Search { fields, needle } => {
                for (field, field_type) in fields {
                    let value = record.field_value(field);
                    field_type.check(field, &value)?;
                    if let Value::String(s) = value {
                        if s.to_lowercase().contains(needle.as_str()) {
                            return Ok(true);
                        }
                    }
                }
                Ok(false)
            }

            Matcher::OneOf {
                field,
                field_type,
                values,
            } => {
                let value = record.field_value(field);
                field_type.check(field, &value)?;
                Ok(match value {
                    Value::String(s) => values.iter().any(|v| v == s),
                    _ => false,
                })
            }

            Matcher::Range {
                field,
                field_type,
                min,
                max,
            } => {
                let value = record.field_value(field);
                field_type.check(field, &value)?;
                if value.is_none() {
                    return Ok(false);
                }
                let above_min = min.map_or(true, |bound| {
                    matches!(compare(&value, &bound), Some(Ordering::Greater | Ordering::Equal))
                });
                let below_max = max.map_or(true, |bound| {
                    matches!(compare(&value, &bound), Some(Ordering::Less | Ordering::Equal))
                });
                Ok(above_min && below_max)
            }
        }
    }
}

/// Compares two values of the same runtime type. NaN compares as `None`.
fn compare(a: &Value<'_>, b: &Value<'_>) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.compare(*b),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
