//! Inclusive date-range filtering of time-series records.
//!
//! Bounds come from the caller and are parsed strictly; record dates come
//! from stored data and a record whose date does not parse is dropped.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Calendar date format used by bounds and record `date` fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Field carrying the record date.
pub const DATE_FIELD: &str = "date";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RangeError {
    #[error("Invalid '{bound}' date format. Expected YYYY-MM-DD.")]
    InvalidBound { bound: &'static str, value: String },
}

/// Raw `from`/`to` query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl RangeQuery {
    /// Parse into a [`DateRange`]. Empty values count as absent.
    pub fn to_range(&self) -> Result<DateRange, RangeError> {
        DateRange::parse(self.from.as_deref(), self.to.as_deref())
    }
}

/// Two optional bounds, both inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, RangeError> {
        Ok(Self {
            from: parse_bound("from", from)?,
            to: parse_bound("to", to)?,
        })
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| from <= date) && self.to.map_or(true, |to| date <= to)
    }
}

fn parse_bound(bound: &'static str, raw: Option<&str>) -> Result<Option<NaiveDate>, RangeError> {
    match raw {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Some)
            .map_err(|_| RangeError::InvalidBound {
                bound,
                value: value.to_string(),
            }),
    }
}

/// Date of a record, if it has a well-formed one.
pub fn record_date(record: &Value) -> Option<NaiveDate> {
    record
        .get(DATE_FIELD)
        .and_then(Value::as_str)
        .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
}

/// Keep the records dated within `range`, preserving order.
///
/// With no bounds the input is returned untouched, malformed dates included.
pub fn filter_by_date(records: Vec<Value>, range: &DateRange) -> Vec<Value> {
    if range.is_unbounded() {
        return records;
    }

    let total = records.len();
    let mut malformed = 0usize;
    let kept: Vec<Value> = records
        .into_iter()
        .filter(|record| match record_date(record) {
            Some(date) => range.contains(date),
            None => {
                malformed += 1;
                false
            }
        })
        .collect();

    if malformed > 0 {
        tracing::debug!(malformed, total, "Dropped records with malformed dates");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn records(dates: &[&str]) -> Vec<Value> {
        dates.iter().map(|d| json!({"date": d, "close": 1.0})).collect()
    }

    fn dates_of(records: &[Value]) -> Vec<&str> {
        records.iter().map(|r| r["date"].as_str().unwrap()).collect()
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let input = records(&["2020-12-31", "2021-01-01", "2021-01-15", "2021-01-31", "2021-02-01"]);
        let range = DateRange::new(Some(date("2021-01-01")), Some(date("2021-01-31")));

        let out = filter_by_date(input, &range);
        assert_eq!(dates_of(&out), vec!["2021-01-01", "2021-01-15", "2021-01-31"]);
    }

    #[test]
    fn test_single_bounds() {
        let input = records(&["2021-01-01", "2021-01-02", "2021-01-03"]);

        let from_only = DateRange::new(Some(date("2021-01-02")), None);
        assert_eq!(dates_of(&filter_by_date(input.clone(), &from_only)), vec!["2021-01-02", "2021-01-03"]);

        let to_only = DateRange::new(None, Some(date("2021-01-02")));
        assert_eq!(dates_of(&filter_by_date(input, &to_only)), vec!["2021-01-01", "2021-01-02"]);
    }

    #[test]
    fn test_unbounded_is_noop_even_with_bad_dates() {
        let input = records(&["2020-01-01", "not-a-date", "2020-01-03"]);
        let out = filter_by_date(input.clone(), &DateRange::default());
        assert_eq!(out, input);
    }

    #[test]
    fn test_malformed_dates_dropped_when_bounded() {
        let mut input = records(&["2020-01-01", "not-a-date", "2020-01-03"]);
        input.push(json!({"close": 2.0}));
        input.push(json!({"date": 20200104}));
        input.push(json!("bare string"));

        let range = DateRange::new(Some(date("2019-01-01")), None);
        let out = filter_by_date(input, &range);
        assert_eq!(dates_of(&out), vec!["2020-01-01", "2020-01-03"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let input = records(&["2021-01-05", "bad", "2021-03-01", "2020-06-30", "2021-01-31"]);
        let range = DateRange::new(Some(date("2021-01-01")), Some(date("2021-01-31")));

        let once = filter_by_date(input, &range);
        let twice = filter_by_date(once.clone(), &range);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let input = records(&["2021-01-01", "2021-01-02"]);
        let range = DateRange::new(Some(date("2021-01-02")), Some(date("2021-01-01")));
        assert!(filter_by_date(input, &range).is_empty());
    }

    #[test]
    fn test_bound_parsing_is_strict() {
        assert_eq!(
            DateRange::parse(Some("2021-01-01"), Some("2021-01-31")).unwrap(),
            DateRange::new(Some(date("2021-01-01")), Some(date("2021-01-31")))
        );
        assert!(DateRange::parse(None, Some("")).unwrap().is_unbounded());

        let err = DateRange::parse(Some("01/01/2021"), None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid 'from' date format. Expected YYYY-MM-DD.");

        let err = DateRange::parse(Some("2021-01-01"), Some("2021-02-30")).unwrap_err();
        assert!(matches!(err, RangeError::InvalidBound { bound: "to", .. }));
    }

    #[test]
    fn test_query_to_range() {
        let query = RangeQuery {
            from: Some("2021-01-01".into()),
            to: None,
        };
        let range = query.to_range().unwrap();
        assert_eq!(range.from, Some(date("2021-01-01")));
        assert_eq!(range.to, None);
    }
}
