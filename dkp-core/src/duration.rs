//! Age literals such as `10d`, `1m2d` or `1y6m`.
//!
//! Units are fixed in order: years (`y`), months (`m`), days (`d`). Every
//! segment is optional but at least one must be present. Months and years
//! are subtracted on the calendar, not as a fixed number of seconds.

use chrono::{DateTime, Days, Months, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::ParseError;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^(?:(?P<years>\d+)y)?(?:(?P<months>\d+)m)?(?:(?P<days>\d+)d)?$") {
        Ok(re) => re,
        Err(_) => unreachable!("static regex pattern"),
    }
});

/// 相对于当前时间的日历偏移
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarOffset {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl CalendarOffset {
    pub fn new(years: u32, months: u32, days: u32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }

    /// The instant this offset points to, counted back from `now`.
    pub fn threshold_from(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, ParseError> {
        let out_of_range = || ParseError::OutOfRange(self.to_string());

        let months = self
            .years
            .checked_mul(12)
            .and_then(|m| m.checked_add(self.months))
            .ok_or_else(out_of_range)?;

        now.checked_sub_months(Months::new(months))
            .and_then(|t| t.checked_sub_days(Days::new(u64::from(self.days))))
            .ok_or_else(out_of_range)
    }

    /// Unix timestamp of [`threshold_from`](Self::threshold_from) the current instant.
    pub fn timestamp(&self) -> Result<i64, ParseError> {
        self.threshold_from(Utc::now()).map(|t| t.timestamp())
    }
}

impl std::fmt::Display for CalendarOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}y{}m{}d", self.years, self.months, self.days)
    }
}

/// Parse an age literal. The empty string is a zero offset.
pub fn parse_duration(s: &str) -> Result<CalendarOffset, ParseError> {
    if s.is_empty() {
        return Ok(CalendarOffset::default());
    }

    let caps = DURATION_RE
        .captures(s)
        .ok_or_else(|| ParseError::Mismatched(s.to_string()))?;

    // The pattern also matches a bare number with no unit at all.
    if caps.name("years").is_none() && caps.name("months").is_none() && caps.name("days").is_none()
    {
        return Err(ParseError::Mismatched(s.to_string()));
    }

    let segment = |name: &str| -> Result<u32, ParseError> {
        match caps.name(name) {
            Some(m) => m.as_str().parse().map_err(|_| ParseError::InvalidNumber {
                input: s.to_string(),
                value: m.as_str().to_string(),
            }),
            None => Ok(0),
        }
    };

    Ok(CalendarOffset {
        years: segment("years")?,
        months: segment("months")?,
        days: segment("days")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_each_unit() {
        assert_eq!(parse_duration("10d").unwrap(), CalendarOffset::new(0, 0, 10));
        assert_eq!(parse_duration("12m").unwrap(), CalendarOffset::new(0, 12, 0));
        assert_eq!(parse_duration("5y").unwrap(), CalendarOffset::new(5, 0, 0));
    }

    #[test]
    fn test_parse_combined_units() {
        assert_eq!(parse_duration("1m2d").unwrap(), CalendarOffset::new(0, 1, 2));
        assert_eq!(parse_duration("1y2m3d").unwrap(), CalendarOffset::new(1, 2, 3));
        assert_eq!(parse_duration("2y10d").unwrap(), CalendarOffset::new(2, 0, 10));
    }

    #[test]
    fn test_empty_is_zero_offset() {
        let offset = parse_duration("").unwrap();
        assert!(offset.is_zero());
    }

    #[test]
    fn test_bare_number_is_rejected() {
        assert_eq!(
            parse_duration("42").unwrap_err(),
            ParseError::Mismatched("42".to_string())
        );
    }

    #[test]
    fn test_rejects_bad_literals() {
        for raw in ["d", "1x", "1d2m", "1.5d", "-1d", "1d ", "abc", "1y1y"] {
            assert!(parse_duration(raw).is_err(), "{raw:?} should not parse");
        }
    }

    #[test]
    fn test_number_overflow_is_reported() {
        assert!(matches!(
            parse_duration("99999999999d"),
            Err(ParseError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_threshold_uses_calendar_months() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let threshold = CalendarOffset::new(0, 1, 0).threshold_from(now).unwrap();
        assert_eq!(threshold, Utc.with_ymd_and_hms(2024, 2, 15, 12, 0, 0).unwrap());

        let threshold = CalendarOffset::new(1, 1, 2).threshold_from(now).unwrap();
        assert_eq!(threshold, Utc.with_ymd_and_hms(2023, 2, 13, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_threshold_clamps_to_month_end() {
        let now = Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap();
        let threshold = CalendarOffset::new(0, 1, 0).threshold_from(now).unwrap();
        assert_eq!(threshold, Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            CalendarOffset::new(u32::MAX, 0, 0).threshold_from(now),
            Err(ParseError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_zero_offset_threshold_is_now() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        assert_eq!(CalendarOffset::default().threshold_from(now).unwrap(), now);
    }
}
