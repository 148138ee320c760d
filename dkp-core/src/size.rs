use regex::Regex;
use std::sync::LazyLock;

use crate::error::ParseError;

static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"^(?P<amount>\d+)(?P<unit>[kKmMgG])$") {
        Ok(re) => re,
        Err(_) => unreachable!("static regex pattern"),
    });

/// 解析大小字符串（如 "500m", "623K", "2G"），按二进制前缀换算为字节
pub fn parse_size(s: &str) -> Result<i64, ParseError> {
    let caps = SIZE_RE
        .captures(s)
        .ok_or_else(|| ParseError::Mismatched(s.to_string()))?;

    let amount: i64 = caps["amount"]
        .parse()
        .map_err(|_| ParseError::InvalidNumber {
            input: s.to_string(),
            value: caps["amount"].to_string(),
        })?;

    byte_size(amount, &caps["unit"])
}

/// 按单位换算字节数，单位不区分大小写
pub fn byte_size(amount: i64, unit: &str) -> Result<i64, ParseError> {
    let base: i64 = match unit.to_ascii_lowercase().as_str() {
        "k" => 1 << 10,
        "m" => 1 << 20,
        "g" => 1 << 30,
        _ => return Err(ParseError::UnsupportedUnit(unit.to_string())),
    };

    amount
        .checked_mul(base)
        .ok_or_else(|| ParseError::OutOfRange(format!("{amount}{unit}")))
}
