//! Campus Query - filter, sort, summarize and paginate record tables.
//!
//! Every tabular screen of the campus dashboard (finance transactions,
//! courses, departments) does the same thing with its records: narrow them
//! with the search box and select controls, order them by a column, total
//! some amounts for the summary cards and cut out one page. This crate is
//! that pipeline as pure functions over borrowed records:
//!
//! - [`filter`] keeps records matching every [`Predicate`] in a [`FilterSpec`]
//! - [`sort`] orders them stably by one field ([`SortSpec`])
//! - [`summarize`] computes named sums and counts ([`SummarySpec`])
//! - [`paginate`] slices out one 1-based [`Page`]
//!
//! [`TableQuery`] chains the four in that order.
//!
//! # Quick Start
//!
//! ```rust
//! use campus_query::{FieldType, Row, Schema, TableQuery};
//!
//! // Declare the fields a screen may query
//! let schema = Schema::new()
//!     .field("id", FieldType::Number)
//!     .field("student", FieldType::Text)
//!     .field("status", FieldType::Enum)
//!     .field("amount", FieldType::Number);
//!
//! let transactions = vec![
//!     Row::new().with("id", 1).with("student", "John Smith").with("status", "paid").with("amount", 45000),
//!     Row::new().with("id", 2).with("student", "Emma Johnson").with("status", "pending").with("amount", 25000),
//!     Row::new().with("id", 3).with("student", "Michael Brown").with("status", "overdue").with("amount", 5000),
//! ];
//!
//! let query = TableQuery::new()
//!     .search(["student"], "o")
//!     .one_of("status", ["pending", "overdue"])
//!     .order_asc("amount")
//!     .total("outstanding", "amount")
//!     .page(10, 1)
//!     .build();
//!
//! let outcome = query.run(&transactions, &schema).unwrap();
//! assert_eq!(outcome.rows().len(), 2);
//! assert_eq!(outcome.rows()[0].get("student").and_then(|s| s.as_value().as_str()), Some("Michael Brown"));
//! assert_eq!(outcome.summary().get("outstanding").map(|n| n.to_f64()), Some(30000.0));
//! ```
//!
//! # Field Types
//!
//! Every queried field is declared in a [`Schema`]. The declared type, not
//! the runtime value, decides which predicates apply and how values compare:
//!
//! | Type | Predicates | Sort order |
//! |------|------------|------------|
//! | Text | `search`, `one_of` | bytewise, case-sensitive |
//! | Enum | `search`, `one_of` | bytewise, case-sensitive |
//! | Number | `range` | numeric |
//! | Timestamp | `range` | chronological |
//!
//! Specs naming an undeclared field, or a predicate the type doesn't
//! support, fail with a configuration [`QueryError`] before any record is
//! read. A record that lacks a field is never an error: it fails range and
//! membership tests, adds nothing to search and sums, and sorts as the
//! smallest value.

mod error;
mod filter;
mod ordering;
mod page;
mod predicate;
mod query;
mod record;
mod schema;
mod summary;
mod value;

// Re-export public API
pub use error::{QueryError, Result};
pub use filter::{filter, FilterSpec};
pub use ordering::{sort, Dir, SortSpec};
pub use page::{paginate, Page, PageRequest};
pub use predicate::Predicate;
pub use query::{one_of_name, range_name, QueryOutcome, TableQuery};
pub use record::{AsValue, Record, RecordSchema, Row};
pub use schema::{FieldType, Schema, SchemaField};
pub use summary::{summarize, AggregateKind, Aggregation, Summary, SummarySpec};
pub use value::{Number, Scalar, Timestamp, Value};
