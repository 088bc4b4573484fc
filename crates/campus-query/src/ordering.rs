//! The sort stage.
//!
//! Provides [`Dir`] for sort direction, [`SortSpec`] for the sort key and
//! [`sort`] itself. The comparator comes from the field's declared type.
//! Sorting is stable and absent values order as the minimum.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{QueryError, Result};
use crate::record::Record;
use crate::schema::{FieldType, Schema};
use crate::value::{Number, Timestamp, Value};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Dir::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Dir::Desc)
    }

    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the opposite direction (a clicked column header).
    pub fn toggled(self) -> Dir {
        match self {
            Dir::Asc => Dir::Desc,
            Dir::Desc => Dir::Asc,
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Dir {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Dir::Asc),
            "desc" | "descending" => Ok(Dir::Desc),
            _ => Err(QueryError::InvalidSort(s.to_string())),
        }
    }
}

/// The field to order by and the direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    /// The field to sort by.
    pub field: String,
    /// The sort direction.
    #[serde(default)]
    pub dir: Dir,
}

impl SortSpec {
    /// Creates a new ascending sort on the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        SortSpec {
            field: field.into(),
            dir: Dir::Asc,
        }
    }

    /// Creates a new descending sort on the given field.
    pub fn desc(field: impl Into<String>) -> Self {
        SortSpec {
            field: field.into(),
            dir: Dir::Desc,
        }
    }

    /// Creates a new sort with the given direction.
    pub fn new(field: impl Into<String>, dir: Dir) -> Self {
        SortSpec {
            field: field.into(),
            dir,
        }
    }

    /// Checks the sort field against the schema.
    pub fn validate(&self, schema: &Schema) -> Result<FieldType> {
        schema.require(&self.field)
    }
}

/// Parses `FIELD` or `FIELD:asc|desc`.
impl FromStr for SortSpec {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        let (field, dir) = match s.split_once(':') {
            Some((field, dir)) => (field, dir.parse()?),
            None => (s, Dir::Asc),
        };
        let field = field.trim();
        if field.is_empty() {
            return Err(QueryError::InvalidSort(s.to_string()));
        }
        Ok(SortSpec::new(field, dir))
    }
}

impl std::fmt::Display for SortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.field, self.dir)
    }
}

/// A record's sort key, extracted once per record.
///
/// Variant order is the ordering of absent keys: `Absent` sorts before
/// every present value.
#[derive(Debug, Clone, Copy)]
enum SortKey<'a> {
    Absent,
    Text(&'a str),
    Number(Number),
    Timestamp(Timestamp),
}

impl<'a> SortKey<'a> {
    fn extract(field: &str, field_type: FieldType, value: Value<'a>) -> Result<Self> {
        field_type.check(field, &value)?;
        Ok(match value {
            Value::None => SortKey::Absent,
            Value::String(s) => SortKey::Text(s),
            Value::Number(n) => SortKey::Number(n),
            Value::Timestamp(t) => SortKey::Timestamp(t),
        })
    }

    fn cmp(&self, other: &SortKey<'_>) -> Ordering {
        match (self, other) {
            (SortKey::Absent, SortKey::Absent) => Ordering::Equal,
            (SortKey::Absent, _) => Ordering::Less,
            (_, SortKey::Absent) => Ordering::Greater,
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(*b),
            (SortKey::Timestamp(a), SortKey::Timestamp(b)) => a.cmp(b),
            // Keys are checked against one declared type, so mixed
            // variants cannot meet here.
            _ => Ordering::Equal,
        }
    }
}

/// Orders records by the declared field and direction.
///
/// The sort is stable: records with equal keys keep their input order, in
/// both directions. A record without the field sorts as the minimum value,
/// first when ascending and last when descending.
///
/// # Example
///
/// ```
/// use campus_query::{sort, FieldType, Row, Schema, SortSpec};
///
/// let schema = Schema::new().field("credits", FieldType::Number);
/// let rows = vec![
///     Row::new().with("credits", 4),
///     Row::new(),
///     Row::new().with("credits", 2),
/// ];
///
/// let sorted = sort(&rows, &schema, &SortSpec::asc("credits")).unwrap();
/// assert!(sorted[0].is_empty());
/// assert_eq!(sorted[2], &rows[0]);
/// ```
pub fn sort<'r, R, I>(records: I, schema: &Schema, spec: &SortSpec) -> Result<Vec<&'r R>>
where
    R: Record + 'r,
    I: IntoIterator<Item = &'r R>,
{
    let field_type = spec.validate(schema)?;

    let mut keyed = records
        .into_iter()
        .map(|record| {
            SortKey::extract(&spec.field, field_type, record.field_value(&spec.field))
                .map(|key| (key, record))
        })
        .collect::<Result<Vec<_>>>()?;

    // `sort_by` is stable.
    keyed.sort_by(|(a, _), (b, _)| spec.dir.apply(a.cmp(b)));

    debug!(records = keyed.len(), field = %spec.field, dir = %spec.dir, "sort");
    Ok(keyed.into_iter().map(|(_, record)| record).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Row;

    fn schema() -> Schema {
        Schema::new()
            .field("id", FieldType::Number)
            .field("code", FieldType::Text)
            .field("credits", FieldType::Number)
            .field("start", FieldType::Timestamp)
    }

    fn ids(rows: &[&Row]) -> Vec<i64> {
        rows.iter()
            .map(|r| match r.id() {
                Value::Number(n) => n.to_f64() as i64,
                _ => -1,
            })
            .collect()
    }

    #[test]
    fn dir_apply() {
        assert_eq!(Dir::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(Dir::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(Dir::Desc.apply(Ordering::Equal), Ordering::Equal);
        assert_eq!(Dir::Asc.toggled(), Dir::Desc);
    }

    #[test]
    fn parse_sort_spec() {
        assert_eq!("amount".parse::<SortSpec>().unwrap(), SortSpec::asc("amount"));
        assert_eq!(
            "amount:desc".parse::<SortSpec>().unwrap(),
            SortSpec::desc("amount")
        );
        assert_eq!(
            "date:DESC".parse::<SortSpec>().unwrap(),
            SortSpec::desc("date")
        );
        assert!("amount:sideways".parse::<SortSpec>().is_err());
        assert!(":asc".parse::<SortSpec>().is_err());
        assert_eq!(SortSpec::desc("amount").to_string(), "amount:desc");
    }

    #[test]
    fn text_is_case_sensitive_bytewise() {
        let rows = vec![
            Row::new().with("id", 1).with("code", "bio101"),
            Row::new().with("id", 2).with("code", "MATH201"),
            Row::new().with("id", 3).with("code", "Art100"),
        ];
        let sorted = sort(&rows, &schema(), &SortSpec::asc("code")).unwrap();
        // Uppercase letters sort before lowercase
        assert_eq!(ids(&sorted), vec![3, 2, 1]);
    }

    #[test]
    fn numbers_compare_numerically() {
        let rows = vec![
            Row::new().with("id", 1).with("credits", 10),
            Row::new().with("id", 2).with("credits", 9),
            Row::new().with("id", 3).with("credits", 2.5f64),
        ];
        let sorted = sort(&rows, &schema(), &SortSpec::asc("credits")).unwrap();
        assert_eq!(ids(&sorted), vec![3, 2, 1]);
    }

    #[test]
    fn absent_sorts_first_ascending_last_descending() {
        let rows = vec![
            Row::new().with("id", 1).with("credits", 3),
            Row::new().with("id", 2),
            Row::new().with("id", 3).with("credits", 1),
        ];
        let asc = sort(&rows, &schema(), &SortSpec::asc("credits")).unwrap();
        assert_eq!(ids(&asc), vec![2, 3, 1]);
        let desc = sort(&rows, &schema(), &SortSpec::desc("credits")).unwrap();
        assert_eq!(ids(&desc), vec![1, 3, 2]);
    }

    #[test]
    fn stable_in_both_directions() {
        let rows = vec![
            Row::new().with("id", 1).with("credits", 3),
            Row::new().with("id", 2).with("credits", 4),
            Row::new().with("id", 3).with("credits", 3),
            Row::new().with("id", 4).with("credits", 4),
        ];
        let asc = sort(&rows, &schema(), &SortSpec::asc("credits")).unwrap();
        assert_eq!(ids(&asc), vec![1, 3, 2, 4]);
        let desc = sort(&rows, &schema(), &SortSpec::desc("credits")).unwrap();
        assert_eq!(ids(&desc), vec![2, 4, 1, 3]);
    }

    #[test]
    fn timestamps_compare_chronologically() {
        let rows = vec![
            Row::new().with("id", 1).with("start", Timestamp(3000)),
            Row::new().with("id", 2).with("start", Timestamp(1000)),
        ];
        let sorted = sort(&rows, &schema(), &SortSpec::asc("start")).unwrap();
        assert_eq!(ids(&sorted), vec![2, 1]);
    }

    #[test]
    fn unknown_field_is_config_error() {
        let rows: Vec<Row> = Vec::new();
        let err = sort(&rows, &schema(), &SortSpec::asc("grade")).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn mixed_runtime_types_are_data_errors() {
        let rows = vec![
            Row::new().with("id", 1).with("credits", 3),
            Row::new().with("id", 2).with("credits", "three"),
        ];
        let err = sort(&rows, &schema(), &SortSpec::asc("credits")).unwrap_err();
        assert_eq!(
            err,
            QueryError::FieldTypeMismatch {
                field: "credits".into(),
                expected: FieldType::Number,
                actual: "string",
            }
        );
    }
}
