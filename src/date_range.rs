//! Date scoping for ledger queries.
//!
//! Play counts are kept per calendar day, so every history query is scoped
//! by a `DateRange`: a single day (today by default, yesterday for the daily
//! review) or no bound at all for all-time totals.

use std::fmt;

use chrono::{Local, NaiveDate};

use crate::error::{Error, Result};

/// A date range for filtering ledger queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    /// Start date (inclusive), or None for no lower bound
    pub start: Option<NaiveDate>,
    /// End date (inclusive), or None for no upper bound
    pub end: Option<NaiveDate>,
    /// Human-readable name for this period
    pub display_name: String,
}

impl DateRange {
    /// Create a new date range with the given bounds and display name.
    #[must_use]
    pub fn new(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            start,
            end,
            display_name: display_name.into(),
        }
    }

    /// Create an unbounded date range (all time).
    #[must_use]
    pub fn all_time() -> Self {
        Self::new(None, None, "All Time")
    }

    /// A single calendar day, displayed as `YYYY-MM-DD`.
    #[must_use]
    pub fn day(date: NaiveDate) -> Self {
        Self::new(Some(date), Some(date), date.format("%Y-%m-%d").to_string())
    }

    /// Today in local time.
    #[must_use]
    pub fn today() -> Self {
        Self::day(today())
    }

    /// The day before `date`.
    #[must_use]
    pub fn day_before(date: NaiveDate) -> Self {
        Self::day(date.pred_opt().unwrap_or(date))
    }

    /// Parse a `YYYY-MM-DD` argument into a single-day range.
    pub fn parse_day(s: &str) -> Result<Self> {
        parse_date(s).map(Self::day)
    }

    /// Get the start date as a SQL-friendly string (YYYY-MM-DD format).
    #[must_use]
    pub fn start_sql(&self) -> Option<String> {
        self.start.map(|d| d.format("%Y-%m-%d").to_string())
    }

    /// Get the end date as a SQL-friendly string (YYYY-MM-DD format).
    #[must_use]
    pub fn end_sql(&self) -> Option<String> {
        self.end.map(|d| d.format("%Y-%m-%d").to_string())
    }

    /// Convert to a tuple of optional SQL strings `(start, end)`.
    #[must_use]
    pub fn to_sql_tuple(&self) -> (Option<String>, Option<String>) {
        (self.start_sql(), self.end_sql())
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::today()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| Error::invalid_input(format!("'{s}' is not a YYYY-MM-DD date: {e}")))
}

/// Today's date in local time; plays are attributed to this day.
#[must_use]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_all_time() {
        let range = DateRange::all_time();
        assert_eq!(range.display_name, "All Time");
        assert_eq!(range.to_sql_tuple(), (None, None));
    }

    #[test]
    fn test_single_day() {
        let range = DateRange::day(date(2024, 3, 9));
        assert_eq!(
            range.to_sql_tuple(),
            (Some("2024-03-09".to_string()), Some("2024-03-09".to_string()))
        );
        assert_eq!(range.to_string(), "2024-03-09");
    }

    #[test]
    fn test_default_is_today() {
        let range = DateRange::default();
        assert_eq!(range.start, Some(Local::now().date_naive()));
        assert_eq!(range.start, range.end);
    }

    #[test]
    fn test_day_before_crosses_month_and_year() {
        assert_eq!(DateRange::day_before(date(2024, 3, 1)).start, Some(date(2024, 2, 29)));
        assert_eq!(DateRange::day_before(date(2025, 1, 1)).start, Some(date(2024, 12, 31)));
    }

    #[test]
    fn test_parse_day() {
        let range = DateRange::parse_day("2023-12-31").unwrap();
        assert_eq!(range.start, Some(date(2023, 12, 31)));

        assert!(matches!(
            DateRange::parse_day("31/12/2023"),
            Err(Error::InvalidInput(_))
        ));
        assert!(DateRange::parse_day("2023-02-30").is_err());
    }
}
