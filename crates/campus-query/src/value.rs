//! Runtime value types for field comparison.
//!
//! [`Value`] is the borrowed value of a field extracted from a record and
//! [`Scalar`] is its owned counterpart, used for range bounds and map-backed
//! rows. Both carry strings, numbers and timestamps; `Value::None` marks a
//! field the record does not have.

use std::cmp::Ordering;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Runtime value for comparison, borrowed from the source record.
///
/// # Example
///
/// ```
/// use campus_query::{Value, Number};
///
/// struct Course {
///     title: String,
///     credits: u8,
/// }
///
/// fn value_of<'a>(course: &'a Course, field: &str) -> Value<'a> {
///     match field {
///         "title" => Value::String(&course.title),
///         "credits" => Value::Number(Number::U64(course.credits as u64)),
///         _ => Value::None,
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    /// String value (borrowed). Used by text and enum fields.
    String(&'a str),
    /// Numeric value.
    Number(Number),
    /// Timestamp value (milliseconds since Unix epoch).
    Timestamp(Timestamp),
    /// Field not present on this record.
    None,
}

impl<'a> Value<'a> {
    /// Returns `true` if this is a `None` value.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the timestamp value, if present.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Short name of the runtime type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Timestamp(_) => "timestamp",
            Value::None => "none",
        }
    }

    /// Copies this value into an owned [`Scalar`]. `None` has no scalar form.
    pub fn to_scalar(&self) -> Option<Scalar> {
        match self {
            Value::String(s) => Some(Scalar::String((*s).to_string())),
            Value::Number(n) => Some(Scalar::Number(*n)),
            Value::Timestamp(t) => Some(Scalar::Timestamp(*t)),
            Value::None => None,
        }
    }
}

/// Owned scalar value.
///
/// Serialized externally tagged (`{"number": 5}`, `{"timestamp": 1704067200000}`)
/// so a timestamp bound in configuration is never mistaken for a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    String(String),
    Number(Number),
    Timestamp(Timestamp),
}

impl Scalar {
    /// Borrows this scalar as a [`Value`].
    pub fn as_value(&self) -> Value<'_> {
        match self {
            Scalar::String(s) => Value::String(s),
            Scalar::Number(n) => Value::Number(*n),
            Scalar::Timestamp(t) => Value::Timestamp(*t),
        }
    }

    /// Short name of the scalar's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        self.as_value().type_name()
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<Number> for Scalar {
    fn from(n: Number) -> Self {
        Scalar::Number(n)
    }
}

impl From<Timestamp> for Scalar {
    fn from(t: Timestamp) -> Self {
        Scalar::Timestamp(t)
    }
}

macro_rules! scalar_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Scalar {
                fn from(n: $ty) -> Self {
                    Scalar::Number(Number::from(n))
                }
            }
        )*
    };
}

scalar_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, usize, isize);

/// Numeric value supporting all common numeric types.
///
/// Numbers keep their integer precision where possible:
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    ///
    /// Integers are compared against floats exactly, so large integers
    /// that round to the same `f64` still order correctly.
    ///
    /// Returns `None` when either side is NaN.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::I64(a), Number::U64(b)) => Some(cmp_signed_unsigned(a, b)),
            (Number::U64(a), Number::I64(b)) => Some(cmp_signed_unsigned(b, a).reverse()),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            (Number::I64(a), Number::F64(b)) => cmp_int_float(i128::from(a), b),
            (Number::U64(a), Number::F64(b)) => cmp_int_float(i128::from(a), b),
            (Number::F64(a), Number::I64(b)) => {
                cmp_int_float(i128::from(b), a).map(Ordering::reverse)
            }
            (Number::F64(a), Number::U64(b)) => {
                cmp_int_float(i128::from(b), a).map(Ordering::reverse)
            }
        }
    }

    /// Total ordering over all numbers, NaN included.
    ///
    /// Agrees with [`Number::compare`] wherever that returns `Some`.
    pub fn total_cmp(self, other: Number) -> Ordering {
        match self.compare(other) {
            Some(ordering) => ordering,
            None => self.to_f64().total_cmp(&other.to_f64()),
        }
    }
}

/// Compares an integer with a float without rounding the integer.
fn cmp_int_float(a: i128, b: f64) -> Option<Ordering> {
    if b.is_nan() {
        return None;
    }
    // every i64 and u64 lies in [-2^63, 2^64)
    if b >= 18_446_744_073_709_551_616.0 {
        return Some(Ordering::Less);
    }
    if b < -9_223_372_036_854_775_808.0 {
        return Some(Ordering::Greater);
    }
    let whole = b.trunc();
    Some(
        a.cmp(&(whole as i128))
            .then_with(|| whole.partial_cmp(&b).unwrap_or(Ordering::Equal)),
    )
}

fn cmp_signed_unsigned(a: i64, b: u64) -> Ordering {
    match u64::try_from(a) {
        Ok(a) => a.cmp(&b),
        Err(_) => Ordering::Less,
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::I64(0)
    }
}

/// Integer sums stay integers until they overflow, then widen to `F64`.
impl Add for Number {
    type Output = Number;

    fn add(self, other: Number) -> Number {
        let widened = || Number::F64(self.to_f64() + other.to_f64());
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => a.checked_add(b).map_or_else(widened, Number::I64),
            (Number::U64(a), Number::U64(b)) => a.checked_add(b).map_or_else(widened, Number::U64),
            (Number::I64(a), Number::U64(b)) | (Number::U64(b), Number::I64(a)) => {
                i64::try_from(b)
                    .ok()
                    .and_then(|b| a.checked_add(b))
                    .map_or_else(widened, Number::I64)
            }
            _ => widened(),
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}

macro_rules! number_from {
    ($variant:ident as $wide:ty: $($ty:ty),+) => {
        $(
            impl From<$ty> for Number {
                fn from(n: $ty) -> Self {
                    Number::$variant(n as $wide)
                }
            }
        )+
    };
}

number_from!(I64 as i64: i8, i16, i32, i64, isize);
number_from!(U64 as u64: u8, u16, u32, u64, usize);
number_from!(F64 as f64: f32, f64);

/// Timestamp value represented as milliseconds since Unix epoch.
///
/// Callers convert from their own date types; the dashboard crate maps
/// calendar dates to midnight UTC.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a new timestamp from seconds since Unix epoch.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs * 1000)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns the timestamp as seconds since Unix epoch.
    pub fn as_secs(self) -> i64 {
        self.0 / 1000
    }
}

impl From<i64> for Timestamp {
    fn from(millis: i64) -> Self {
        Timestamp(millis)
    }
}
