//! Query builder and executor.
//!
//! [`TableQuery`] bundles the specs of one table view and runs the stages in
//! their fixed order: filter, then sort, then summarize and paginate over the
//! same ordered set. Running the stages by hand in another order is allowed
//! but nothing then guarantees the cards agree with the rows.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::filter::{filter, FilterSpec};
use crate::ordering::{sort, Dir, SortSpec};
use crate::page::{page_of, page_size, Page, PageRequest};
use crate::predicate::Predicate;
use crate::record::Record;
use crate::schema::Schema;
use crate::summary::{summarize, Aggregation, Summary, SummarySpec};
use crate::value::Scalar;

/// Everything one table view asks of its records.
///
/// # Example
///
/// ```
/// use campus_query::{FieldType, Row, Schema, TableQuery};
///
/// let schema = Schema::new()
///     .field("id", FieldType::Number)
///     .field("status", FieldType::Enum)
///     .field("amount", FieldType::Number);
/// let rows = vec![
///     Row::new().with("id", 1).with("status", "paid").with("amount", 45000),
///     Row::new().with("id", 2).with("status", "pending").with("amount", 25000),
///     Row::new().with("id", 3).with("status", "overdue").with("amount", 5000),
/// ];
///
/// let query = TableQuery::new()
///     .one_of("status", ["pending", "overdue"])
///     .order_desc("amount")
///     .total("total", "amount")
///     .page(10, 1)
///     .build();
///
/// let outcome = query.run(&rows, &schema).unwrap();
/// assert_eq!(outcome.rows().len(), 2);
/// assert_eq!(outcome.summary().get("total").map(|n| n.to_f64()), Some(30000.0));
/// assert_eq!(outcome.page().total_pages, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableQuery {
    pub filter: FilterSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    pub summary: SummarySpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageRequest>,
}

impl TableQuery {
    /// Creates a query that keeps every record in input order.
    pub fn new() -> Self {
        TableQuery::default()
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// Sets a named predicate, replacing any with the same name.
    pub fn with_predicate(mut self, name: impl Into<String>, predicate: Predicate) -> Self {
        self.filter.set(name, predicate);
        self
    }

    /// Sets the search box predicate.
    pub fn search<I, S>(self, fields: I, term: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_predicate("search", Predicate::search(fields, term))
    }

    /// Sets the membership predicate of a field, named `one_of:{field}`.
    ///
    /// A select control and a range control on the same field keep separate
    /// predicates, so neither hides the other from validation.
    pub fn one_of<I, S>(self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_predicate(one_of_name(field), Predicate::one_of(field, values))
    }

    /// Sets the range predicate of a field, named `range:{field}`.
    pub fn range(self, field: &str, min: Option<Scalar>, max: Option<Scalar>) -> Self {
        self.with_predicate(
            range_name(field),
            Predicate::Range {
                field: field.to_string(),
                min,
                max,
            },
        )
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Sets the sort. A later call replaces an earlier one.
    pub fn order_by(mut self, field: &str, dir: Dir) -> Self {
        self.sort = Some(SortSpec::new(field, dir));
        self
    }

    pub fn order_asc(self, field: &str) -> Self {
        self.order_by(field, Dir::Asc)
    }

    pub fn order_desc(self, field: &str) -> Self {
        self.order_by(field, Dir::Desc)
    }

    // ========================================================================
    // Summary and paging
    // ========================================================================

    /// Adds an aggregation.
    pub fn aggregate(mut self, aggregation: Aggregation) -> Self {
        self.summary = self.summary.with(aggregation);
        self
    }

    /// Adds an unconditional sum.
    pub fn total(self, name: &str, field: &str) -> Self {
        self.aggregate(Aggregation::sum(name, field))
    }

    /// Requests one page of the result.
    pub fn page(mut self, size: usize, number: usize) -> Self {
        self.page = Some(PageRequest::new(size, number));
        self
    }

    /// Finalizes the query.
    pub fn build(self) -> Self {
        self
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Checks every spec against the schema without reading any record.
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        self.filter.validate(schema)?;
        if let Some(sort) = &self.sort {
            sort.validate(schema)?;
        }
        self.summary.validate(schema)?;
        if let Some(page) = &self.page {
            page.validate()?;
        }
        Ok(())
    }

    /// Runs filter, sort, summarize and paginate.
    ///
    /// All specs are validated first, so a misconfigured query fails even
    /// when there are no records.
    pub fn run<'r, R, I>(&self, records: I, schema: &Schema) -> Result<QueryOutcome<'r, R>>
    where
        R: Record + 'r,
        I: IntoIterator<Item = &'r R>,
    {
        self.validate(schema)?;
        let page = self
            .page
            .map(|request| page_size(request.size).map(|size| (size, request.number)))
            .transpose()?;

        let mut rows = filter(records, schema, &self.filter)?;
        if let Some(spec) = &self.sort {
            rows = sort(rows, schema, spec)?;
        }
        let summary = summarize(rows.iter().copied(), schema, &self.summary)?;

        debug!(rows = rows.len(), aggregations = summary.len(), "query");
        Ok(QueryOutcome { rows, summary, page })
    }
}

/// Name of the predicate [`TableQuery::one_of`] sets for `field`.
pub fn one_of_name(field: &str) -> String {
    format!("one_of:{}", field)
}

/// Name of the predicate [`TableQuery::range`] sets for `field`.
pub fn range_name(field: &str) -> String {
    format!("range:{}", field)
}

/// The result of [`TableQuery::run`].
///
/// Rows, page and summary all derive from the same filtered, ordered set.
#[derive(Debug, Clone)]
pub struct QueryOutcome<'r, R> {
    rows: Vec<&'r R>,
    summary: Summary,
    page: Option<(NonZeroUsize, usize)>,
}

impl<'r, R> QueryOutcome<'r, R> {
    /// Every matching record, in sorted order.
    pub fn rows(&self) -> &[&'r R] {
        &self.rows
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// The requested page. Without a page request, one page holds every row.
    pub fn page(&self) -> Page<'_, &'r R> {
        match self.page {
            Some((size, number)) => page_of(&self.rows, size, number),
            None => {
                let size = NonZeroUsize::new(self.rows.len()).unwrap_or(NonZeroUsize::MIN);
                page_of(&self.rows, size, 1)
            }
        }
    }

    /// Consumes the outcome, returning the sorted rows.
    pub fn into_rows(self) -> Vec<&'r R> {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryError;
    use crate::record::Row;
    use crate::schema::FieldType;
    use crate::value::Number;

    fn schema() -> Schema {
        Schema::new()
            .field("id", FieldType::Number)
            .field("student", FieldType::Text)
            .field("status", FieldType::Enum)
            .field("amount", FieldType::Number)
    }

    fn rows() -> Vec<Row> {
        let students = ["Ada", "Ben", "Cleo", "Dev", "Eli", "Fay", "Gus"];
        let statuses = ["paid", "pending", "overdue"];
        students
            .iter()
            .enumerate()
            .map(|(i, student)| {
                Row::new()
                    .with("id", i as i64 + 1)
                    .with("student", *student)
                    .with("status", statuses[i % 3])
                    .with("amount", (i as i64 + 1) * 1000)
            })
            .collect()
    }

    fn ids(rows: &[&Row]) -> Vec<i64> {
        rows.iter()
            .filter_map(|r| r.id().as_number())
            .map(|n| n.to_f64() as i64)
            .collect()
    }

    #[test]
    fn empty_query_keeps_everything() {
        let rows = rows();
        let outcome = TableQuery::new().run(&rows, &schema()).unwrap();
        assert_eq!(ids(outcome.rows()), vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(outcome.page().total_pages, 1);
        assert_eq!(outcome.page().len(), 7);
        assert!(outcome.summary().is_empty());
    }

    #[test]
    fn stages_run_in_order() {
        let rows = rows();
        let query = TableQuery::new()
            .one_of("status", ["pending", "overdue"])
            .order_desc("amount")
            .total("total", "amount")
            .page(2, 2)
            .build();
        let outcome = query.run(&rows, &schema()).unwrap();

        // pending/overdue ids: 2, 3, 5, 6; by amount desc: 6, 5, 3, 2
        assert_eq!(ids(outcome.rows()), vec![6, 5, 3, 2]);
        let page = outcome.page();
        assert_eq!(ids(page.records), vec![3, 2]);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.total_count, 4);
        // The summary covers all filtered rows, not just the page.
        assert_eq!(outcome.summary().get("total"), Some(Number::I64(16000)));
    }

    #[test]
    fn validates_before_reading_records() {
        let empty: Vec<Row> = Vec::new();
        let cases = [
            TableQuery::new().one_of("grade", ["A"]),
            TableQuery::new().order_asc("grade"),
            TableQuery::new().total("total", "student"),
            TableQuery::new().page(0, 1),
        ];
        for query in cases {
            let err = query.run(&empty, &schema()).unwrap_err();
            assert!(err.is_config_error(), "{err}");
        }
    }

    #[test]
    fn zero_page_size_is_reported() {
        let rows = rows();
        let err = TableQuery::new().page(0, 1).run(&rows, &schema()).unwrap_err();
        assert_eq!(err, QueryError::InvalidPageSize);
    }

    #[test]
    fn search_replaces_previous_term() {
        let rows = rows();
        let query = TableQuery::new()
            .search(["student"], "a")
            .search(["student"], "cle");
        let outcome = query.run(&rows, &schema()).unwrap();
        assert_eq!(ids(outcome.rows()), vec![3]);
    }

    #[test]
    fn range_control() {
        let rows = rows();
        let query = TableQuery::new().range("amount", Some(Scalar::from(2000)), Some(Scalar::from(4000)));
        let outcome = query.run(&rows, &schema()).unwrap();
        assert_eq!(ids(outcome.rows()), vec![2, 3, 4]);
    }

    #[test]
    fn select_and_range_on_one_field_are_both_validated() {
        let query = TableQuery::new()
            .one_of("amount", ["5"])
            .range("amount", Some(Scalar::from(1)), None);
        assert_eq!(query.filter.len(), 2);
        assert_eq!(
            query.validate(&schema()),
            Err(QueryError::PredicateNotSupported {
                predicate: "one_of",
                field: "amount".into(),
                field_type: FieldType::Number,
            })
        );
    }

    #[test]
    fn controls_replace_only_their_own_predicate() {
        let query = TableQuery::new()
            .one_of("status", ["paid"])
            .range("amount", Some(Scalar::from(1000)), None)
            .one_of("status", ["pending"]);
        assert_eq!(query.filter.len(), 2);
        assert_eq!(
            query.filter.get(&one_of_name("status")),
            Some(&Predicate::one_of("status", ["pending"]))
        );
        assert!(query.filter.get(&range_name("amount")).is_some());
    }

    #[test]
    fn deserializes_from_json() {
        let query: TableQuery = serde_json::from_str(
            r#"{
                "filter": {"one_of:status": {"kind": "one_of", "field": "status", "values": ["paid"]}},
                "sort": {"field": "amount", "dir": "desc"},
                "page": {"size": 5}
            }"#,
        )
        .unwrap();
        assert_eq!(
            query,
            TableQuery::new()
                .one_of("status", ["paid"])
                .order_desc("amount")
                .page(5, 1)
        );
    }
}
