//! The summarize stage.
//!
//! A [`SummarySpec`] lists named aggregations. Each sums a numeric field
//! (or counts records) over the records matching its optional predicate.
//! Summaries are meant for the *filtered* set so the totals on a screen
//! always agree with its rows.

use std::collections::HashSet;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::error::{QueryError, Result};
use crate::predicate::{Matcher, Predicate};
use crate::record::Record;
use crate::schema::{FieldType, Schema};
use crate::value::{Number, Value};

/// What an aggregation computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKind {
    /// Sum of a numeric field.
    #[default]
    Sum,
    /// Number of matching records.
    Count,
}

/// One named aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub name: String,
    #[serde(default)]
    pub kind: AggregateKind,
    /// The summed field. Required for `Sum`, ignored for `Count`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Only records matching this predicate contribute. `None` means all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<Predicate>,
}

impl Aggregation {
    /// Sums `field` over every record.
    pub fn sum(name: impl Into<String>, field: impl Into<String>) -> Self {
        Aggregation {
            name: name.into(),
            kind: AggregateKind::Sum,
            field: Some(field.into()),
            when: None,
        }
    }

    /// Counts every record.
    pub fn count(name: impl Into<String>) -> Self {
        Aggregation {
            name: name.into(),
            kind: AggregateKind::Count,
            field: None,
            when: None,
        }
    }

    /// Restricts the aggregation to records matching `predicate`.
    pub fn when(mut self, predicate: Predicate) -> Self {
        self.when = Some(predicate);
        self
    }

    /// Checks the aggregation against a schema.
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        if let Some(predicate) = &self.when {
            predicate.validate(schema)?;
        }
        if self.kind == AggregateKind::Count {
            return Ok(());
        }
        let field = self
            .field
            .as_deref()
            .ok_or_else(|| QueryError::MissingSumField {
                name: self.name.clone(),
            })?;
        match schema.require(field)? {
            FieldType::Number => Ok(()),
            field_type => Err(QueryError::NotNumeric {
                name: self.name.clone(),
                field: field.to_string(),
                field_type,
            }),
        }
    }
}

/// Ordered list of aggregations, one per summary card.
///
/// # Example
///
/// ```
/// use campus_query::{Aggregation, Predicate, SummarySpec};
///
/// let spec = SummarySpec::new()
///     .total("total", "amount")
///     .with(Aggregation::sum("pending", "amount").when(Predicate::equals("status", "pending")))
///     .with(Aggregation::count("records"));
///
/// assert_eq!(spec.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummarySpec {
    aggregations: Vec<Aggregation>,
}

impl SummarySpec {
    pub fn new() -> Self {
        SummarySpec::default()
    }

    /// Adds an aggregation. One with the same name is replaced in place.
    pub fn with(mut self, aggregation: Aggregation) -> Self {
        match self
            .aggregations
            .iter_mut()
            .find(|a| a.name == aggregation.name)
        {
            Some(existing) => *existing = aggregation,
            None => self.aggregations.push(aggregation),
        }
        self
    }

    /// Adds an unconditional sum of `field`.
    pub fn total(self, name: impl Into<String>, field: impl Into<String>) -> Self {
        self.with(Aggregation::sum(name, field))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aggregation> {
        self.aggregations.iter()
    }

    pub fn len(&self) -> usize {
        self.aggregations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregations.is_empty()
    }

    /// Validates each aggregation and rejects repeated names.
    ///
    /// [`SummarySpec::with`] replaces by name, but a deserialized spec can
    /// still list a name twice.
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        let mut seen = HashSet::new();
        self.aggregations.iter().try_for_each(|aggregation| {
            if !seen.insert(aggregation.name.as_str()) {
                return Err(QueryError::DuplicateAggregation {
                    name: aggregation.name.clone(),
                });
            }
            aggregation.validate(schema)
        })
    }
}

/// Aggregation results, in spec order.
///
/// Serializes as a map from aggregation name to number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    values: Vec<(String, Number)>,
}

impl Summary {
    /// Returns the result of the named aggregation.
    pub fn get(&self, name: &str) -> Option<Number> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Number)> {
        self.values.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Summary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

struct Compiled<'s> {
    aggregation: &'s Aggregation,
    matcher: Matcher<'s>,
    total: Number,
}

/// Computes every aggregation in `spec` over `records`.
///
/// Every aggregation appears in the result; one that matches nothing is 0.
/// Records without the summed field contribute nothing. A summed field that
/// holds a non-number is a data error: strings are never coerced.
///
/// # Example
///
/// ```
/// use campus_query::{summarize, FieldType, Row, Schema, SummarySpec};
///
/// let schema = Schema::new().field("amount", FieldType::Number);
/// let rows = vec![Row::new().with("amount", 25000), Row::new().with("amount", 5000)];
///
/// let summary = summarize(&rows, &schema, &SummarySpec::new().total("total", "amount")).unwrap();
/// assert_eq!(summary.get("total").map(|n| n.to_f64()), Some(30000.0));
/// ```
pub fn summarize<'r, R, I>(records: I, schema: &Schema, spec: &SummarySpec) -> Result<Summary>
where
    R: Record + 'r,
    I: IntoIterator<Item = &'r R>,
{
    spec.validate(schema)?;

    let mut compiled = spec
        .aggregations
        .iter()
        .map(|aggregation| {
            let matcher = match &aggregation.when {
                Some(predicate) => Matcher::compile(predicate, schema)?,
                None => Matcher::Always,
            };
            Ok(Compiled {
                aggregation,
                matcher,
                total: Number::default(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let mut count = 0usize;
    for record in records {
        count += 1;
        for entry in compiled.iter_mut() {
            if !entry.matcher.matches(record)? {
                continue;
            }
            entry.total = entry.total + contribution(entry.aggregation, record)?;
        }
    }

    debug!(records = count, aggregations = compiled.len(), "summarize");
    Ok(Summary {
        values: compiled
            .into_iter()
            .map(|entry| (entry.aggregation.name.clone(), entry.total))
            .collect(),
    })
}

fn contribution<R: Record + ?Sized>(aggregation: &Aggregation, record: &R) -> Result<Number> {
    let field = match (aggregation.kind, aggregation.field.as_deref()) {
        (AggregateKind::Count, _) => return Ok(Number::I64(1)),
        (AggregateKind::Sum, Some(field)) => field,
        // validate() rejects sums without a field
        (AggregateKind::Sum, None) => return Ok(Number::default()),
    };
    match record.field_value(field) {
        Value::Number(n) => Ok(n),
        Value::None => Ok(Number::default()),
        other => Err(QueryError::NonNumericValue {
            name: aggregation.name.clone(),
            field: field.to_string(),
            actual: other.type_name(),
        }),
    }
}
