use chrono::NaiveDate;

use crate::error::TypeError;

/// A calendar day. Entries are dated to the day; there is no time component.
pub type Day = NaiveDate;

/// Parse an ISO-8601 calendar day (`YYYY-MM-DD`). Surrounding whitespace is
/// ignored.
pub fn parse_day(s: &str) -> Result<Day, TypeError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| TypeError::InvalidDate(s.to_string()))
}

/// Whole days from `earlier` to `later`. Negative when `later` precedes `earlier`.
pub fn days_between(earlier: Day, later: Day) -> i64 {
    (later - earlier).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_day() {
        let d = parse_day("2024-01-10").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn trims_whitespace() {
        assert!(parse_day("  2024-02-29 ").is_ok());
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(
            parse_day("yesterday"),
            Err(TypeError::InvalidDate("yesterday".into()))
        );
        assert!(parse_day("2023-02-29").is_err());
        assert!(parse_day("").is_err());
    }

    #[test]
    fn day_difference() {
        let a = parse_day("2024-01-03").unwrap();
        let b = parse_day("2024-01-10").unwrap();
        assert_eq!(days_between(a, b), 7);
        assert_eq!(days_between(b, a), -7);
        assert_eq!(days_between(a, a), 0);
    }
}
