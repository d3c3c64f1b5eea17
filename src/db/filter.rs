//! Query filter utilities for building parameterized SQL queries.

use crate::date_range::DateRange;

/// Date range filter on the ledger's `play_date` column.
#[derive(Debug, Clone, Default)]
pub struct DateFilter<'a> {
    pub start: Option<&'a str>,
    pub end: Option<&'a str>,
}

impl<'a> DateFilter<'a> {
    /// Create a new date filter.
    pub const fn new(start: Option<&'a str>, end: Option<&'a str>) -> Self {
        Self { start, end }
    }

    /// Append date filter clauses to a query string.
    /// Bounds are inclusive calendar days.
    pub fn apply(&self, query: &mut String, params: &mut Vec<String>) {
        if let Some(start) = self.start {
            query.push_str(" AND ph.play_date >= CAST(? AS DATE)");
            params.push(start.to_string());
        }
        if let Some(end) = self.end {
            query.push_str(" AND ph.play_date <= CAST(? AS DATE)");
            params.push(end.to_string());
        }
    }
}

/// Build the WHERE-clause suffix and its parameters for a range.
pub fn for_range(range: &DateRange, query: &mut String) -> Vec<String> {
    let (start, end) = range.to_sql_tuple();
    let mut params = Vec::new();
    DateFilter::new(start.as_deref(), end.as_deref()).apply(query, &mut params);
    params
}
