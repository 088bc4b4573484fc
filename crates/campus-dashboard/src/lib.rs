//! # Campus Dashboard
//!
//! The finance, course and department tables of a campus administration
//! dashboard, built on `campus-query`.
//!
//! Each [`Screen`] has a record type ([`Transaction`], [`Course`],
//! [`Department`]), a built-in [`ScreenConfig`] and a set of controls
//! ([`ScreenQuery`]): a search box, select filters, range bounds, a sortable
//! header and a pager. [`show`] runs the controls against a slice of records
//! and renders the visible page, the footer and the summary cards.
//!
//! ```
//! use campus_dashboard::{show, OutputFormat, Screen, ScreenQuery, Transaction};
//!
//! let records: Vec<Transaction> = serde_json::from_str(r#"[
//!     {"id": 1, "student": "John Smith", "description": "Tuition Fee",
//!      "category": "tuition", "status": "paid", "amount": 45000, "date": "2024-01-15"},
//!     {"id": 2, "student": "Emma Johnson", "description": "Library Fine",
//!      "category": "fines", "status": "overdue", "amount": 120, "date": "2024-01-20"}
//! ]"#).unwrap();
//!
//! let config = Screen::Finance.default_config();
//! let controls = ScreenQuery::new().filter("status", ["overdue"]);
//! let out = show(Screen::Finance, &config, &records, &controls, OutputFormat::Csv, false).unwrap();
//!
//! assert_eq!(
//!     out,
//!     "id,student,description,category,status,amount,date\n\
//!      2,Emma Johnson,Library Fine,fines,overdue,120,2024-01-20\n"
//! );
//! ```
//!
//! Screens are reconfigured with a YAML or JSON file, see [`DashboardConfig`].

pub mod config;
pub mod error;
pub mod load;
pub mod models;
pub mod output;
pub mod screen;

use campus_query::RecordSchema;
use serde::Serialize;
use tracing::debug;

pub use config::{DashboardConfig, ScreenOverrides};
pub use error::{DashboardError, Result};
pub use load::{load_records, records_from_json};
pub use models::{Course, CourseStatus, Date, Department, PaymentStatus, Transaction};
pub use output::{OutputFormat, Renderer};
pub use screen::{parse_bound, parse_filter, Bounds, Screen, ScreenConfig, ScreenQuery};

/// Queries `records` with the screen's controls and renders the result.
///
/// `styled` emboldens the table header; other formats ignore it.
pub fn show<R>(
    screen: Screen,
    config: &ScreenConfig,
    records: &[R],
    controls: &ScreenQuery,
    format: OutputFormat,
    styled: bool,
) -> Result<String>
where
    R: RecordSchema + Serialize,
{
    let schema = R::schema();
    let outcome = config.query(controls).run(records, &schema)?;
    debug!(
        %screen,
        matched = outcome.rows().len(),
        of = records.len(),
        "ran screen query"
    );
    Renderer::new(screen, config, &schema)?
        .styled(styled)
        .render(&outcome, format)
}
