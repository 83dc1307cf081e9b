//! Record filtering by date range, month, branch, channel and weekday.
//!
//! Every populated field of a [`FilterState`] is an independent predicate and
//! the predicates are combined with logical AND. Empty sets and `None` fields
//! do not restrict anything.

use crate::error::{DashboardError, Result};
use crate::schema::SalesRecord;
use crate::utils::{parse_record_date, weekday_index};
use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Inclusive date range. A missing `to` makes it a single-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to: Some(to) }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self { from: day, to: None }
    }

    /// Builds a range from "YYYY-MM-DD" strings, e.g. as received from a date picker.
    pub fn parse(from: &str, to: Option<&str>) -> Result<Self> {
        let parse = |text: &str| {
            parse_record_date(text.trim())
                .ok_or_else(|| DashboardError::InvalidDate(text.to_string()))
        };
        Ok(Self {
            from: parse(from)?,
            to: to.map(parse).transpose()?,
        })
    }

    pub fn end(&self) -> NaiveDate {
        self.to.unwrap_or(self.from)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub date_range: Option<DateRange>,
    /// "YYYY-MM", matched as a prefix of the record's date string.
    #[serde(default)]
    pub selected_month: Option<String>,
    #[serde(default)]
    pub branches: BTreeSet<String>,
    #[serde(default)]
    pub channels: BTreeSet<String>,
    /// Weekday indices, 0 = Sunday through 6 = Saturday.
    #[serde(default)]
    pub days_of_week: BTreeSet<u8>,
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    #[must_use]
    pub fn with_month(mut self, month: &str) -> Self {
        self.selected_month = Some(month.to_string());
        self
    }

    #[must_use]
    pub fn with_branch(mut self, branch: &str) -> Self {
        self.branches.insert(branch.to_string());
        self
    }

    #[must_use]
    pub fn with_channel(mut self, channel: &str) -> Self {
        self.channels.insert(channel.to_string());
        self
    }

    #[must_use]
    pub fn with_day_of_week(mut self, day: u8) -> Self {
        self.days_of_week.insert(day);
        self
    }

    /// Returns true if the filter is empty (matches every record with a valid date).
    pub fn is_empty(&self) -> bool {
        self.date_range.is_none()
            && self.selected_month.is_none()
            && self.branches.is_empty()
            && self.channels.is_empty()
            && self.days_of_week.is_empty()
    }

    pub fn matches(&self, record: &SalesRecord) -> bool {
        if !self.branches.is_empty() && !self.branches.contains(&record.branch_name) {
            return false;
        }
        if !self.channels.is_empty() && !self.channels.contains(&record.channel_name) {
            return false;
        }
        if let Some(month) = &self.selected_month {
            if !record.date.starts_with(month.as_str()) {
                return false;
            }
        }

        let Some(date) = parse_record_date(&record.date) else {
            return false;
        };

        if let Some(range) = &self.date_range {
            if !range.contains(date) {
                return false;
            }
        }
        if !self.days_of_week.is_empty() && !self.days_of_week.contains(&weekday_index(date)) {
            return false;
        }

        true
    }
}

/// Returns the records that satisfy every populated predicate, in input order.
pub fn filter_records(records: &[SalesRecord], filters: &FilterState) -> Vec<SalesRecord> {
    let undated = records
        .iter()
        .filter(|r| parse_record_date(&r.date).is_none())
        .count();
    if undated > 0 {
        warn!(
            "Excluding {} record(s) with a missing or unparsable date",
            undated
        );
    }

    let filtered: Vec<SalesRecord> = records
        .iter()
        .filter(|r| filters.matches(r))
        .cloned()
        .collect();

    debug!(
        "Filter kept {} of {} records",
        filtered.len(),
        records.len()
    );

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_records() -> Vec<SalesRecord> {
        vec![
            SalesRecord::new("2024-03-01", "A", "X", 100.0, 2, 50.0),
            SalesRecord::new("2024-03-02", "A", "Y", 50.0, 1, 0.0),
            SalesRecord::new("2024-03-03", "B", "X", 80.0, 4, 40.0),
            SalesRecord::new("2024-04-05", "B", "Y", 30.0, 1, 10.0),
            SalesRecord::new("2024-04-06", "A", "X", 20.0, 1, 0.0),
        ]
    }

    fn dates(records: &[SalesRecord]) -> Vec<&str> {
        records.iter().map(|r| r.date.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything_in_order() {
        let records = sample_records();
        let filtered = filter_records(&records, &FilterState::new());
        assert_eq!(filtered, records);
    }

    #[test]
    fn test_empty_input() {
        let filters = FilterState::new().with_branch("A").with_month("2024-03");
        assert!(filter_records(&[], &filters).is_empty());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let filters = FilterState::new()
            .with_date_range(DateRange::new(day(2024, 3, 2), day(2024, 4, 5)));
        let filtered = filter_records(&sample_records(), &filters);
        assert_eq!(dates(&filtered), vec!["2024-03-02", "2024-03-03", "2024-04-05"]);
    }

    #[test]
    fn test_open_ended_range_is_single_day() {
        let filters = FilterState::new().with_date_range(DateRange::single_day(day(2024, 3, 3)));
        let filtered = filter_records(&sample_records(), &filters);
        assert_eq!(dates(&filtered), vec!["2024-03-03"]);
    }

    #[test]
    fn test_date_range_parse() {
        let range = DateRange::parse("2024-03-01", Some("2024-03-31")).unwrap();
        assert_eq!(range, DateRange::new(day(2024, 3, 1), day(2024, 3, 31)));

        let single = DateRange::parse("2024-03-02", None).unwrap();
        assert_eq!(single.end(), day(2024, 3, 2));

        assert!(matches!(
            DateRange::parse("2024-03-01", Some("soon")),
            Err(DashboardError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_month_prefix() {
        let filters = FilterState::new().with_month("2024-04");
        let filtered = filter_records(&sample_records(), &filters);
        assert_eq!(dates(&filtered), vec!["2024-04-05", "2024-04-06"]);
    }

    #[test]
    fn test_branch_and_channel_sets() {
        let filters = FilterState::new().with_branch("A").with_channel("X");
        let filtered = filter_records(&sample_records(), &filters);
        assert_eq!(dates(&filtered), vec!["2024-03-01", "2024-04-06"]);

        let filters = FilterState::new().with_branch("A").with_branch("B").with_channel("Y");
        let filtered = filter_records(&sample_records(), &filters);
        assert_eq!(dates(&filtered), vec!["2024-03-02", "2024-04-05"]);
    }

    #[test]
    fn test_day_of_week() {
        // 2024-03-01 and 2024-04-05 are Fridays
        let filters = FilterState::new().with_day_of_week(5);
        let filtered = filter_records(&sample_records(), &filters);
        assert_eq!(dates(&filtered), vec!["2024-03-01", "2024-04-05"]);

        let filters = FilterState::new().with_day_of_week(0).with_day_of_week(6);
        let filtered = filter_records(&sample_records(), &filters);
        assert_eq!(dates(&filtered), vec!["2024-03-02", "2024-03-03", "2024-04-06"]);
    }

    #[test]
    fn test_undated_records_always_excluded() {
        let mut records = sample_records();
        records.push(SalesRecord::new("", "A", "X", 999.0, 9, 0.0));
        records.push(SalesRecord::new("2024-03-xx", "A", "X", 999.0, 9, 0.0));

        let filtered = filter_records(&records, &FilterState::new());
        assert_eq!(filtered.len(), 5);

        // The month prefix alone must not let a malformed date through
        let filtered = filter_records(&records, &FilterState::new().with_month("2024-03"));
        assert_eq!(dates(&filtered), vec!["2024-03-01", "2024-03-02", "2024-03-03"]);
    }

    #[test]
    fn test_sequential_filters_equal_conjunction() {
        let records = sample_records();
        let steps = [
            FilterState::new().with_date_range(DateRange::new(day(2024, 3, 1), day(2024, 4, 30))),
            FilterState::new().with_month("2024-03"),
            FilterState::new().with_branch("A"),
            FilterState::new().with_channel("X"),
            FilterState::new().with_day_of_week(5),
        ];

        let combined = FilterState {
            date_range: steps[0].date_range,
            selected_month: steps[1].selected_month.clone(),
            branches: steps[2].branches.clone(),
            channels: steps[3].channels.clone(),
            days_of_week: steps[4].days_of_week.clone(),
        };

        let sequential = steps
            .iter()
            .fold(records.clone(), |acc, step| filter_records(&acc, step));
        let at_once = filter_records(&records, &combined);

        assert_eq!(sequential, at_once);
        assert_eq!(dates(&at_once), vec!["2024-03-01"]);
    }

    #[test]
    fn test_is_empty() {
        assert!(FilterState::new().is_empty());
        assert!(!FilterState::new().with_day_of_week(1).is_empty());
    }
}
