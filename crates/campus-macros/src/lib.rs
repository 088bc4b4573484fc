//! Proc macros for campus-query.
//!
//! # Derive Macros
//!
//! - [`Record`] - Make a struct queryable by the filter, sort and summary
//!   pipeline
//!
//! For working examples, see `campus-dashboard/tests/record_derive.rs`.

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `Record` and `RecordSchema` for a struct with named fields.
///
/// Only fields carrying a `#[field(...)]` type are queryable; the rest are
/// invisible to the pipeline.
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `Text` | Free text (search, one_of, lexicographic sort) |
/// | `Enum` | Closed value set (search, one_of, lexicographic sort) |
/// | `Number` | Numeric field (range, sums, numeric sort) |
/// | `Timestamp` | Date-like field (range, chronological sort) |
/// | `skip` | Exclude this field |
/// | `rename = "..."` | Use a custom name in queries |
/// | `ty = "..."` | Spell the type as a string (`ty = "enum"`) |
///
/// Field values are read through `campus_query::AsValue`, which covers
/// strings, numeric primitives, `Timestamp` and `Option<T>`. Implement it
/// for your own enums and date types.
///
/// # Generated Code
///
/// 1. A `pub const` per queryable field, named in SCREAMING_SNAKE_CASE
/// 2. `Record::field_value()` returning `Value::None` for unknown names
/// 3. `RecordSchema::schema()` listing the fields in declaration order
///
/// # Example
///
/// ```ignore
/// use campus_macros::Record;
/// use campus_query::{AsValue, RecordSchema, TableQuery, Value};
///
/// enum Status { Active, Archived }
///
/// impl AsValue for Status {
///     fn as_value(&self) -> Value<'_> {
///         Value::String(match self {
///             Status::Active => "active",
///             Status::Archived => "archived",
///         })
///     }
/// }
///
/// #[derive(Record)]
/// struct Course {
///     #[field(Text)]
///     title: String,
///
///     #[field(Number)]
///     credits: u8,
///
///     #[field(Enum)]
///     status: Status,
///
///     #[field(skip)]
///     syllabus: String,
/// }
///
/// let query = TableQuery::new()
///     .one_of(Course::STATUS, ["active"])
///     .order_desc(Course::CREDITS)
///     .build();
/// let outcome = query.run(&courses, &Course::schema())?;
/// ```
#[proc_macro_derive(Record, attributes(field))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
