use crate::error::{DashboardError, Result};
use chrono::{Datelike, NaiveDate};

/// Parses a record date in strict `YYYY-MM-DD` form.
/// Returns `None` for anything else, including the empty string of a missing date.
pub fn parse_record_date(date: &str) -> Option<NaiveDate> {
    if date.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Validates a month string in the format "YYYY-MM"
/// Returns the first day of that month
pub fn parse_month(month: &str) -> Result<NaiveDate> {
    let bytes = month.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return Err(DashboardError::InvalidMonth(month.to_string()));
    }

    let start_str = format!("{}-01", month);
    NaiveDate::parse_from_str(&start_str, "%Y-%m-%d")
        .map_err(|_| DashboardError::InvalidMonth(month.to_string()))
}

/// Formats the month a date belongs to as "YYYY-MM"
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Weekday index with Sunday = 0 through Saturday = 6.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Replaces non-finite amounts with zero so nothing downstream sees NaN.
pub fn coerce_amount(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Clamps an overflowed result to the largest finite magnitude.
pub fn saturate(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(f64::MIN, f64::MAX)
    }
}

/// Adds amounts, saturating at `f64::MAX` instead of reaching infinity.
pub fn saturating_sum<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .fold(0.0, |acc, value| saturate(acc + value))
}

/// Adds counts, saturating at `u64::MAX`.
pub fn saturating_count<I>(values: I) -> u64
where
    I: IntoIterator<Item = u64>,
{
    values
        .into_iter()
        .fold(0u64, |acc, value| acc.saturating_add(value))
}

/// `numerator / denominator`, or 0 when the denominator is not positive.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        saturate(numerator / denominator)
    } else {
        0.0
    }
}

pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        return 0.0;
    }

    let scaled = numerator * 100.0 / denominator;
    if scaled.is_finite() {
        scaled
    } else {
        // numerator * 100 overflowed; divide first
        saturate(numerator / denominator * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_date() {
        assert_eq!(
            parse_record_date("2024-03-01"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(parse_record_date(""), None);
        assert_eq!(parse_record_date("2024-3-1"), None);
        assert_eq!(parse_record_date("2024-02-30"), None);
        assert_eq!(parse_record_date("01/03/2024"), None);
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(
            parse_month("2024-03").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("2024-3").is_err());
        assert!(parse_month("2024/03").is_err());
        assert!(parse_month("").is_err());
    }

    #[test]
    fn test_month_key() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(month_key(date), "2024-03");
    }

    #[test]
    fn test_weekday_index() {
        // 2024-03-01 was a Friday, 2024-03-03 a Sunday
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()), 5);
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()), 0);
        assert_eq!(weekday_index(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()), 6);
    }

    #[test]
    fn test_zero_guards() {
        assert_eq!(ratio(100.0, 0.0), 0.0);
        assert_eq!(ratio(100.0, 4.0), 25.0);
        assert_eq!(percentage(150.0, 0.0), 0.0);
        assert_eq!(percentage(150.0, 1000.0), 15.0);
        assert_eq!(coerce_amount(f64::NAN), 0.0);
        assert_eq!(coerce_amount(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_saturating_arithmetic() {
        assert_eq!(saturating_sum([1e308, 1e308]), f64::MAX);
        assert_eq!(saturating_sum([-1e308, -1e308]), f64::MIN);
        assert_eq!(saturating_sum([0.5, 0.25]), 0.75);
        assert_eq!(saturating_count([u64::MAX, 1]), u64::MAX);
        assert_eq!(saturating_count([2, 3]), 5);

        assert_eq!(percentage(f64::MAX, 0.5), f64::MAX);
        assert_eq!(percentage(f64::MAX, f64::MAX), 100.0);
        assert_eq!(ratio(f64::MAX, 0.5), f64::MAX);
        assert!(ratio(f64::MAX, 1e-300).is_finite());
    }
}
