//! Filter expressions of the form `field<op>value`.
//!
//! ```text
//! created>10d       # created more than 10 days ago
//! exited>=1m2d      # exited at least 1 month and 2 days ago
//! name=nginx        # image repository name
//! size<=500M        # image size
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{FilterError, FilterResult, ParseError};
use crate::op::Op;

// Two-character operators come first so `>=` is never read as `>` + `=`.
static FILTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    match Regex::new(r"^(?P<field>[A-Za-z0-9_]+)(?P<op>!=|<=|>=|=|<|>)(?P<value>[^=\s]\S*)$") {
        Ok(re) => re,
        Err(_) => unreachable!("static regex pattern"),
    }
});

/// 解析后的过滤条件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// Raw expression, kept for diagnostics.
    pub source: String,
    pub field: String,
    pub comparator: Op,
    /// Unparsed value; its meaning depends on the field.
    pub value: String,
}

impl Filter {
    pub fn new(field: impl Into<String>, comparator: Op, value: impl Into<String>) -> Self {
        let field = field.into();
        let value = value.into();
        Self {
            source: format!("{field}{comparator}{value}"),
            field,
            comparator,
            value,
        }
    }

    /// Parse a whole filter expression. Partial matches are rejected.
    pub fn parse(raw: &str) -> FilterResult<Self> {
        let trimmed = raw.trim();
        let caps = FILTER_RE
            .captures(trimmed)
            .ok_or_else(|| ParseError::Mismatched(raw.to_string()))?;

        Ok(Self {
            source: raw.to_string(),
            field: caps["field"].to_string(),
            comparator: caps["op"].parse()?,
            value: caps["value"].to_string(),
        })
    }

    /// Parse every expression, stopping at the first malformed one.
    pub fn parse_all<S: AsRef<str>>(raws: &[S]) -> FilterResult<Vec<Self>> {
        raws.iter().map(|raw| Self::parse(raw.as_ref())).collect()
    }
}

impl FromStr for Filter {
    type Err = FilterError;

    fn from_str(s: &str) -> FilterResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.field, self.comparator, self.value)
    }
}
