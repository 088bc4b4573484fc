//! Declared field types.
//!
//! Every queryable field carries a [`FieldType`]. The schema, not the
//! runtime value, decides which comparator a sort uses and which predicates
//! a field accepts, so sparsely populated fields order consistently.

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, Result};
use crate::value::Value;

/// Declared type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Free text. Searchable, sorted lexicographically.
    Text,
    /// A value from a closed set (status, category). Filterable by
    /// membership, sorted lexicographically.
    Enum,
    /// Numeric. Range-filterable and summable.
    Number,
    /// Date-like. Range-filterable, sorted chronologically.
    Timestamp,
}

impl FieldType {
    /// Returns the display name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Enum => "enum",
            FieldType::Number => "number",
            FieldType::Timestamp => "timestamp",
        }
    }

    /// Returns `true` if a value of this runtime type may live in a field of
    /// this declared type. Absent values are always acceptable.
    pub fn accepts(self, value: &Value<'_>) -> bool {
        match (self, value) {
            (_, Value::None) => true,
            (FieldType::Text | FieldType::Enum, Value::String(_)) => true,
            (FieldType::Number, Value::Number(_)) => true,
            (FieldType::Timestamp, Value::Timestamp(_)) => true,
            _ => false,
        }
    }

    /// Returns `true` for types compared as strings.
    pub fn is_textual(self) -> bool {
        matches!(self, FieldType::Text | FieldType::Enum)
    }

    /// Returns `true` for types that support range predicates.
    pub fn is_ordinal(self) -> bool {
        matches!(self, FieldType::Number | FieldType::Timestamp)
    }

    /// Checks a record value against this declared type.
    pub(crate) fn check(self, field: &str, value: &Value<'_>) -> Result<()> {
        if self.accepts(value) {
            Ok(())
        } else {
            Err(QueryError::FieldTypeMismatch {
                field: field.to_string(),
                expected: self,
                actual: value.type_name(),
            })
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered set of declared fields for one kind of record.
///
/// # Example
///
/// ```
/// use campus_query::{FieldType, Schema};
///
/// let schema = Schema::new()
///     .field("id", FieldType::Number)
///     .field("status", FieldType::Enum)
///     .field("amount", FieldType::Number);
///
/// assert_eq!(schema.get("status"), Some(FieldType::Enum));
/// assert!(schema.require("grade").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    fields: Vec<SchemaField>,
}

/// A single declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Schema::default()
    }

    /// Declares a field, replacing any earlier declaration of the same name.
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.field_type = field_type,
            None => self.fields.push(SchemaField { name, field_type }),
        }
        self
    }

    /// Returns the declared type of a field.
    pub fn get(&self, name: &str) -> Option<FieldType> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.field_type)
    }

    /// Returns the declared type of a field, or [`QueryError::UnknownField`].
    pub fn require(&self, name: &str) -> Result<FieldType> {
        self.get(name).ok_or_else(|| QueryError::UnknownField {
            field: name.to_string(),
        })
    }

    /// Returns `true` if the field is declared.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over the declared fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &SchemaField> {
        self.fields.iter()
    }

    /// Returns the declared field names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
