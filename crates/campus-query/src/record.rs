//! Record access traits and the map-backed [`Row`].
//!
//! The pipeline reads records only through [`Record::field_value`], so any
//! type can be queried: typed structs (usually via `#[derive(Record)]` from
//! `campus-macros`) or dynamic [`Row`]s.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::Schema;
use crate::value::{Number, Scalar, Timestamp, Value};

/// Trait for types that can flow through the query pipeline.
///
/// This trait is typically derived using `#[derive(Record)]` from the
/// `campus-macros` crate, but can also be implemented manually.
///
/// # Manual Implementation
///
/// ```
/// use campus_query::{Record, Value, Number};
///
/// struct Department {
///     name: String,
///     budget: f64,
/// }
///
/// impl Record for Department {
///     fn field_value(&self, field: &str) -> Value<'_> {
///         match field {
///             "name" => Value::String(&self.name),
///             "budget" => Value::Number(Number::F64(self.budget)),
///             _ => Value::None,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Returns the value of a field, or [`Value::None`] if the record has
    /// no such field.
    fn field_value(&self, field: &str) -> Value<'_>;
}

impl<R: Record + ?Sized> Record for &R {
    fn field_value(&self, field: &str) -> Value<'_> {
        (**self).field_value(field)
    }
}

/// Records whose fields are known at compile time.
///
/// Generated by `#[derive(Record)]` alongside the [`Record`] impl.
pub trait RecordSchema: Record {
    /// Returns the declared fields of this record type.
    fn schema() -> Schema;
}

/// Conversion of a struct field into a [`Value`].
///
/// The derive macro calls this for every annotated field. Implement it for
/// your own enums and date types:
///
/// ```
/// use campus_query::{AsValue, Value};
///
/// enum Status {
///     Active,
///     Archived,
/// }
///
/// impl AsValue for Status {
///     fn as_value(&self) -> Value<'_> {
///         Value::String(match self {
///             Status::Active => "active",
///             Status::Archived => "archived",
///         })
///     }
/// }
/// ```
pub trait AsValue {
    fn as_value(&self) -> Value<'_>;
}

impl AsValue for String {
    fn as_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl AsValue for str {
    fn as_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl AsValue for &str {
    fn as_value(&self) -> Value<'_> {
        Value::String(self)
    }
}

impl AsValue for Number {
    fn as_value(&self) -> Value<'_> {
        Value::Number(*self)
    }
}

impl AsValue for Timestamp {
    fn as_value(&self) -> Value<'_> {
        Value::Timestamp(*self)
    }
}

impl AsValue for Scalar {
    fn as_value(&self) -> Value<'_> {
        Scalar::as_value(self)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_value(&self) -> Value<'_> {
        match self {
            Some(inner) => inner.as_value(),
            None => Value::None,
        }
    }
}

macro_rules! as_value_number {
    ($($ty:ty),*) => {
        $(
            impl AsValue for $ty {
                fn as_value(&self) -> Value<'_> {
                    Value::Number(Number::from(*self))
                }
            }
        )*
    };
}

as_value_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, usize, isize);

/// A dynamic record: an ordered map from field name to [`Scalar`].
///
/// Fields the row does not hold read as [`Value::None`].
///
/// ```
/// use campus_query::{Record, Row, Value, Number};
///
/// let row = Row::new()
///     .with("id", 1)
///     .with("status", "paid")
///     .with("amount", 45000);
///
/// assert_eq!(row.field_value("status"), Value::String("paid"));
/// assert_eq!(row.field_value("amount"), Value::Number(Number::I64(45000)));
/// assert!(row.field_value("date").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    fields: BTreeMap<String, Scalar>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Row::default()
    }

    /// Sets a field, builder style.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets a field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Scalar>) -> Option<Scalar> {
        self.fields.insert(field.into(), value.into())
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, field: &str) -> Option<Scalar> {
        self.fields.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&Scalar> {
        self.fields.get(field)
    }

    /// The row's identity, read from its `id` field.
    pub fn id(&self) -> Value<'_> {
        self.field_value("id")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Record for Row {
    fn field_value(&self, field: &str) -> Value<'_> {
        self.fields
            .get(field)
            .map_or(Value::None, |scalar| scalar.as_value())
    }
}

impl<K: Into<String>, V: Into<Scalar>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
