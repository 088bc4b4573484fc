//! Records shown by the dashboard's tables.
//!
//! All three deserialize from the JSON the dashboard is fed, with dates as
//! `YYYY-MM-DD` strings and statuses in lowercase.

use std::fmt;
use std::str::FromStr;

use campus_macros::Record;
use campus_query::{AsValue, Timestamp, Value};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar date. Queried as a timestamp at midnight UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(pub NaiveDate);

impl Date {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Date)
    }

    pub fn timestamp(self) -> Timestamp {
        Timestamp::from_millis(self.0.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
    }

    /// The UTC calendar date of a timestamp.
    pub fn from_timestamp(timestamp: Timestamp) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_millis(timestamp.as_millis()).map(|dt| Date(dt.date_naive()))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for Date {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map(Date)
    }
}

impl AsValue for Date {
    fn as_value(&self) -> Value<'_> {
        Value::Timestamp(self.timestamp())
    }
}

macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl AsValue for $name {
            fn as_value(&self) -> Value<'_> {
                Value::String(self.as_str())
            }
        }
    };
}

status_enum! {
    /// Settlement state of a transaction.
    PaymentStatus {
        Paid => "paid",
        Pending => "pending",
        Overdue => "overdue",
    }
}

status_enum! {
    /// Whether a course is currently offered.
    CourseStatus {
        Active => "active",
        Inactive => "inactive",
        Archived => "archived",
    }
}

/// A fee payment by a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
pub struct Transaction {
    #[field(Number)]
    pub id: u64,
    #[field(Text)]
    pub student: String,
    #[field(Text)]
    pub description: String,
    #[field(Enum)]
    pub category: String,
    #[field(Enum)]
    pub status: PaymentStatus,
    #[field(Number)]
    pub amount: f64,
    #[field(Timestamp)]
    pub date: Date,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
pub struct Course {
    #[field(Number)]
    pub id: u64,
    #[field(Text)]
    pub code: String,
    #[field(Text)]
    pub title: String,
    #[field(Enum)]
    pub department: String,
    #[field(Text)]
    pub instructor: String,
    #[field(Number)]
    pub credits: u32,
    #[field(Enum)]
    pub status: CourseStatus,
    #[field(Number)]
    pub enrolled: u32,
    #[field(Number)]
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
pub struct Department {
    #[field(Number)]
    pub id: u64,
    #[field(Text)]
    pub name: String,
    #[field(Text)]
    pub code: String,
    /// Head of department. Vacant posts are `null`.
    #[field(Text)]
    #[serde(default)]
    pub head: Option<String>,
    #[field(Number)]
    pub faculty: u32,
    #[field(Number)]
    pub students: u32,
    #[field(Number)]
    pub budget: f64,
    /// Year founded.
    #[field(Number)]
    pub established: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_query::{FieldType, Record, RecordSchema};

    #[test]
    fn date_is_midnight_utc() {
        let date: Date = "1970-01-02".parse().unwrap();
        assert_eq!(date.timestamp(), Timestamp(86_400_000));
        assert_eq!(Date::from_timestamp(Timestamp(86_400_000)), Some(date));
        assert_eq!(date.to_string(), "1970-01-02");
        assert!("02/01/1970".parse::<Date>().is_err());
    }

    #[test]
    fn date_serde_is_iso() {
        let date: Date = serde_json::from_str(r#""2024-03-15""#).unwrap();
        assert_eq!(Date::from_ymd(2024, 3, 15), Some(date));
        assert_eq!(serde_json::to_string(&date).unwrap(), r#""2024-03-15""#);
    }

    #[test]
    fn statuses_read_as_lowercase_strings() {
        assert_eq!(PaymentStatus::Overdue.as_value(), Value::String("overdue"));
        assert_eq!(CourseStatus::ALL.len(), 3);
        let status: PaymentStatus = serde_json::from_str(r#""pending""#).unwrap();
        assert_eq!(status, PaymentStatus::Pending);
    }

    #[test]
    fn transaction_schema_and_constants() {
        let schema = Transaction::schema();
        assert_eq!(
            schema.names(),
            vec!["id", "student", "description", "category", "status", "amount", "date"]
        );
        assert_eq!(schema.get(Transaction::STATUS), Some(FieldType::Enum));
        assert_eq!(schema.get(Transaction::DATE), Some(FieldType::Timestamp));
    }

    #[test]
    fn vacant_head_is_absent() {
        let dept: Department = serde_json::from_str(
            r#"{"id": 1, "name": "Physics", "code": "PHY", "head": null,
                "faculty": 12, "students": 240, "budget": 1500000, "established": 1962}"#,
        )
        .unwrap();
        assert!(dept.field_value(Department::HEAD).is_none());
        assert_eq!(dept.field_value("code"), Value::String("PHY"));
    }
}
