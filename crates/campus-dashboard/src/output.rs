//! Rendering query results as a text table, JSON or CSV.

use campus_query::{FieldType, Number, Page, QueryOutcome, Record, Schema, Summary, Value};
use clap::ValueEnum;
use console::style;
use serde::{Deserialize, Serialize};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::error::{DashboardError, Result};
use crate::models::Date;
use crate::screen::{Screen, ScreenConfig};

/// Cells wider than this are truncated in table output.
pub const MAX_CELL_WIDTH: usize = 32;

const COLUMN_GAP: &str = "  ";

/// Output format of the `campus` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned text table with page footer and summary cards.
    #[default]
    Table,
    /// The page, summary and paging info as one JSON document.
    Json,
    /// The page's rows as CSV.
    Csv,
}

/// Formats a field value for display.
///
/// Timestamps show as `YYYY-MM-DD`, whole floats without decimals, absent
/// values as an empty string.
pub fn format_value(value: Value<'_>) -> String {
    match value {
        Value::String(s) => s.to_string(),
        Value::Number(n) => format_number(n),
        Value::Timestamp(t) => Date::from_timestamp(t)
            .map(|d| d.to_string())
            .unwrap_or_else(|| t.as_millis().to_string()),
        Value::None => String::new(),
    }
}

pub fn format_number(n: Number) -> String {
    match n {
        Number::F64(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{:.0}", f)
        }
        Number::F64(f) if f.is_finite() => format!("{:.2}", f),
        other => other.to_string(),
    }
}

/// Truncates to a display width, marking the cut with an ellipsis.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn pad(s: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(s.width()));
    if right_align {
        format!("{}{}", fill, s)
    } else {
        format!("{}{}", s, fill)
    }
}

/// "Showing 11 to 20 of 45 entries (page 2 of 5)".
pub fn page_footer<T>(page: &Page<'_, T>) -> String {
    let position = format!("page {} of {}", page.page_number, page.total_pages);
    match page.span() {
        Some((first, last)) => format!(
            "Showing {} to {} of {} entries ({})",
            first, last, page.total_count, position
        ),
        None => format!("No entries to show ({})", position),
    }
}

#[derive(Serialize)]
struct PageInfo {
    number: usize,
    size: usize,
    total_pages: usize,
    total_count: usize,
}

#[derive(Serialize)]
struct JsonView<'a, R> {
    screen: Screen,
    page: PageInfo,
    summary: &'a Summary,
    records: &'a [&'a R],
}

/// Renders one screen's query outcome.
#[derive(Debug, Clone)]
pub struct Renderer<'a> {
    screen: Screen,
    columns: Vec<(&'a str, FieldType)>,
    styled: bool,
}

impl<'a> Renderer<'a> {
    /// Resolves the configured columns against the schema.
    pub fn new(screen: Screen, config: &'a ScreenConfig, schema: &'a Schema) -> Result<Self> {
        let columns = config
            .columns(schema)
            .into_iter()
            .map(|name| schema.require(name).map(|ty| (name, ty)))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Renderer {
            screen,
            columns,
            styled: false,
        })
    }

    /// Emboldens the table header with ANSI codes.
    pub fn styled(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    pub fn render<R>(&self, outcome: &QueryOutcome<'_, R>, format: OutputFormat) -> Result<String>
    where
        R: Record + Serialize,
    {
        match format {
            OutputFormat::Table => Ok(self.table(outcome)),
            OutputFormat::Json => self.json(outcome),
            OutputFormat::Csv => self.csv(&outcome.page()),
        }
    }

    fn cells<R: Record>(&self, record: &R) -> Vec<String> {
        self.columns
            .iter()
            .map(|(name, _)| format_value(record.field_value(name)))
            .collect()
    }

    fn table<R: Record>(&self, outcome: &QueryOutcome<'_, R>) -> String {
        let page = outcome.page();
        let rows: Vec<Vec<String>> = page
            .iter()
            .map(|record| {
                self.cells(*record)
                    .iter()
                    .map(|cell| truncate_to_width(cell, MAX_CELL_WIDTH))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, (name, _))| {
                rows.iter()
                    .map(|row| row[i].width())
                    .chain(std::iter::once(name.width()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(rows.len() + 6);

        let header = self
            .columns
            .iter()
            .zip(&widths)
            .map(|((name, ty), width)| {
                let cell = pad(name, *width, *ty == FieldType::Number);
                if self.styled {
                    style(cell).bold().force_styling(true).to_string()
                } else {
                    cell
                }
            })
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);
        lines.push(header.trim_end().to_string());
        lines.push(
            widths
                .iter()
                .map(|w| "─".repeat(*w))
                .collect::<Vec<_>>()
                .join(COLUMN_GAP),
        );

        for row in &rows {
            let line = row
                .iter()
                .zip(&widths)
                .zip(&self.columns)
                .map(|((cell, width), (_, ty))| pad(cell, *width, *ty == FieldType::Number))
                .collect::<Vec<_>>()
                .join(COLUMN_GAP);
            lines.push(line.trim_end().to_string());
        }

        lines.push(String::new());
        lines.push(page_footer(&page));

        let summary = outcome.summary();
        if !summary.is_empty() {
            let name_width = summary.iter().map(|(name, _)| name.width()).max().unwrap_or(0);
            lines.push(String::new());
            for (name, value) in summary.iter() {
                lines.push(format!(
                    "{}  {}",
                    pad(name, name_width, false),
                    format_number(value)
                ));
            }
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    fn json<R: Serialize>(&self, outcome: &QueryOutcome<'_, R>) -> Result<String> {
        let page = outcome.page();
        let view = JsonView {
            screen: self.screen,
            page: PageInfo {
                number: page.page_number,
                size: page.page_size,
                total_pages: page.total_pages,
                total_count: page.total_count,
            },
            summary: outcome.summary(),
            records: page.records,
        };
        let mut out = serde_json::to_string_pretty(&view)?;
        out.push('\n');
        Ok(out)
    }

    fn csv<R: Record>(&self, page: &Page<'_, &R>) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(self.columns.iter().map(|(name, _)| *name))?;
        for record in page.iter() {
            writer.write_record(self.cells(*record))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| DashboardError::Csv(csv::Error::from(e.into_error())))?;
        String::from_utf8(bytes).map_err(|e| {
            DashboardError::Csv(csv::Error::from(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                e,
            )))
        })
    }
}
