//! Container status lines as printed by the runtime.
//!
//! ```text
//! Exited (143) 20 weeks ago
//! Exited (0) About an hour ago
//! Up 2 seconds
//! Up 3 hours (healthy)
//! Created
//! ```

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::duration::CalendarOffset;
use crate::error::{FilterError, FilterResult, ParseError};

pub const STATE_EXITED: &str = "Exited";

static STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^(?P<state>\w+)(?:\s+\((?P<code>-?\d+)\))?(?:\s+(?P<age>.+))?$") {
        Ok(re) => re,
        Err(_) => unreachable!("static regex pattern"),
    }
});

// Prefix match: anything after the unit ("ago", "(healthy)") is ignored.
static AGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(
        r"^(?:(?P<num>\d+)|(?P<one>(?i:about an?|an?))|(?P<zero>(?i:less than an?)))\s+(?P<unit>[A-Za-z]+)",
    ) {
        Ok(re) => re,
        Err(_) => unreachable!("static regex pattern"),
    }
});

/// 状态中的时间单位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl AgeUnit {
    /// Accepts singular and plural spellings in any case.
    pub fn from_word(word: &str) -> Option<Self> {
        let word = word.to_ascii_lowercase();
        match word.strip_suffix('s').unwrap_or(&word) {
            "second" => Some(Self::Seconds),
            "minute" => Some(Self::Minutes),
            "hour" => Some(Self::Hours),
            "day" => Some(Self::Days),
            "week" => Some(Self::Weeks),
            "month" => Some(Self::Months),
            "year" => Some(Self::Years),
            _ => None,
        }
    }
}

/// 容器状态
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub state: String,
    /// Zero when the status carries no exit code.
    pub exit_code: i32,
    pub num: u32,
    pub unit: String,
}

impl StatusInfo {
    pub fn is_exited(&self) -> bool {
        self.state == STATE_EXITED
    }

    pub fn age_unit(&self) -> Option<AgeUnit> {
        AgeUnit::from_word(&self.unit)
    }

    /// When the container exited, counted back from `now`.
    pub fn exited_at(&self, now: DateTime<Utc>) -> FilterResult<DateTime<Utc>> {
        if !self.is_exited() {
            return Err(FilterError::NotExited(self.state.clone()));
        }

        let mut offset = CalendarOffset::default();
        let mut clock = Duration::zero();
        match self.age_unit() {
            Some(AgeUnit::Years) => offset.years = self.num,
            Some(AgeUnit::Months) => offset.months = self.num,
            Some(AgeUnit::Weeks) => {
                offset.days = self
                    .num
                    .checked_mul(7)
                    .ok_or_else(|| ParseError::OutOfRange(self.describe_age()))?;
            }
            Some(AgeUnit::Days) => offset.days = self.num,
            Some(AgeUnit::Hours) => clock = Duration::hours(i64::from(self.num)),
            Some(AgeUnit::Minutes) => clock = Duration::minutes(i64::from(self.num)),
            Some(AgeUnit::Seconds) => clock = Duration::seconds(i64::from(self.num)),
            None => {}
        }

        let then = offset.threshold_from(now)?;
        then.checked_sub_signed(clock)
            .ok_or_else(|| ParseError::OutOfRange(self.describe_age()).into())
    }

    /// Unix timestamp of [`exited_at`](Self::exited_at) the current instant.
    pub fn exited_timestamp(&self) -> FilterResult<i64> {
        self.exited_at(Utc::now()).map(|t| t.timestamp())
    }

    fn describe_age(&self) -> String {
        format!("{} {}", self.num, self.unit)
    }
}

/// 解析容器状态字符串
pub fn parse_status(s: &str) -> Result<StatusInfo, ParseError> {
    let trimmed = s.trim();
    let caps = STATUS_RE
        .captures(trimmed)
        .ok_or_else(|| ParseError::Mismatched(s.to_string()))?;

    let number = |value: &str| ParseError::InvalidNumber {
        input: s.to_string(),
        value: value.to_string(),
    };

    let mut status = StatusInfo {
        state: caps["state"].to_string(),
        ..Default::default()
    };

    if let Some(code) = caps.name("code") {
        status.exit_code = code.as_str().parse().map_err(|_| number(code.as_str()))?;
    }

    if let Some(age) = caps.name("age").and_then(|m| AGE_RE.captures(m.as_str())) {
        status.num = match age.name("num") {
            Some(num) => num.as_str().parse().map_err(|_| number(num.as_str()))?,
            None if age.name("one").is_some() => 1,
            None => 0,
        };
        status.unit = age["unit"].to_string();
    }

    Ok(status)
}
