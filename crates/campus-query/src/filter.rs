//! The filter stage.
//!
//! A [`FilterSpec`] holds named predicates combined with AND. Names let a
//! screen replace one control's predicate (the search box, a status select)
//! without touching the others.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::Result;
use crate::predicate::{Matcher, Predicate};
use crate::record::Record;
use crate::schema::Schema;

/// Named predicates, all of which must hold.
///
/// # Example
///
/// ```
/// use campus_query::{FilterSpec, Predicate};
///
/// let mut spec = FilterSpec::new()
///     .with("status", Predicate::one_of("status", ["pending", "overdue"]));
///
/// // The search box replaces its own predicate on every keystroke.
/// spec.set("search", Predicate::search(["student"], "a"));
/// spec.set("search", Predicate::search(["student"], "ad"));
/// assert_eq!(spec.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec {
    predicates: BTreeMap<String, Predicate>,
}

impl FilterSpec {
    /// Creates an empty spec. An empty spec matches every record.
    pub fn new() -> Self {
        FilterSpec::default()
    }

    /// Adds a named predicate, builder style.
    pub fn with(mut self, name: impl Into<String>, predicate: Predicate) -> Self {
        self.set(name, predicate);
        self
    }

    /// Sets a named predicate, returning the one it replaced.
    pub fn set(&mut self, name: impl Into<String>, predicate: Predicate) -> Option<Predicate> {
        self.predicates.insert(name.into(), predicate)
    }

    /// Removes a named predicate.
    pub fn remove(&mut self, name: &str) -> Option<Predicate> {
        self.predicates.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Predicate> {
        self.predicates.get(name)
    }

    /// Iterates over `(name, predicate)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Predicate)> {
        self.predicates.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Returns `true` if at least one predicate constrains anything.
    pub fn is_active(&self) -> bool {
        self.predicates.values().any(Predicate::is_active)
    }

    /// Checks every predicate, active or not, against the schema.
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        self.predicates
            .values()
            .try_for_each(|predicate| predicate.validate(schema))
    }

    /// Tests a single record against every predicate.
    pub fn matches<R: Record + ?Sized>(&self, record: &R, schema: &Schema) -> Result<bool> {
        let matchers = self.compile(schema)?;
        all_match(&matchers, record)
    }

    fn compile(&self, schema: &Schema) -> Result<Vec<Matcher<'_>>> {
        let mut matchers = Vec::with_capacity(self.predicates.len());
        for (name, predicate) in &self.predicates {
            let matcher = Matcher::compile(predicate, schema)?;
            if matcher.is_always() {
                trace!(predicate = %name, "skipping inactive predicate");
                continue;
            }
            matchers.push(matcher);
        }
        Ok(matchers)
    }
}

fn all_match<R: Record + ?Sized>(matchers: &[Matcher<'_>], record: &R) -> Result<bool> {
    for matcher in matchers {
        if !matcher.matches(record)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Keeps the records for which every predicate in `spec` holds.
///
/// The output preserves input order. An empty or fully inactive spec
/// returns every record. `spec` is validated before any record is read,
/// so an unknown field is an error even on empty input.
///
/// # Example
///
/// ```
/// use campus_query::{filter, FieldType, FilterSpec, Predicate, Row, Schema};
///
/// let schema = Schema::new()
///     .field("id", FieldType::Number)
///     .field("status", FieldType::Enum);
/// let rows = vec![
///     Row::new().with("id", 1).with("status", "paid"),
///     Row::new().with("id", 2).with("status", "pending"),
/// ];
/// let spec = FilterSpec::new().with("status", Predicate::equals("status", "pending"));
///
/// let kept = filter(&rows, &schema, &spec).unwrap();
/// assert_eq!(kept.len(), 1);
/// ```
pub fn filter<'r, R, I>(records: I, schema: &Schema, spec: &FilterSpec) -> Result<Vec<&'r R>>
where
    R: Record + 'r,
    I: IntoIterator<Item = &'r R>,
{
    let matchers = spec.compile(schema)?;
    let mut total = 0usize;
    let mut kept = Vec::new();

    for record in records {
        total += 1;
        if all_match(&matchers, record)? {
            kept.push(record);
        }
    }

    debug!(input = total, output = kept.len(), predicates = matchers.len(), "filter");
    Ok(kept)
}
