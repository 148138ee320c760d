//! Comparison operators and the typed comparators they select.
//!
//! Every [`Op`] maps to exactly one comparator per value domain. The domain
//! is a type parameter, so an integer threshold can never be compared with a
//! string field at call time.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{FilterError, FilterResult};

/// 比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl Op {
    pub const ALL: [Op; 6] = [Op::Eq, Op::Ne, Op::Lt, Op::Le, Op::Gt, Op::Ge];

    pub fn symbol(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Gt => ">",
            Op::Ge => ">=",
        }
    }

    pub fn valid_symbols() -> &'static str {
        "=, !=, <, <=, >, >="
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Op {
    type Err = FilterError;

    fn from_str(s: &str) -> FilterResult<Self> {
        Op::ALL
            .into_iter()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| FilterError::UnknownOperator(s.to_string()))
    }
}

// Ordered by symbol text.
impl Ord for Op {
    fn cmp(&self, other: &Self) -> Ordering {
        self.symbol().cmp(other.symbol())
    }
}

impl PartialOrd for Op {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// 同一值域上的二元比较器
pub struct Comparator<T: ?Sized> {
    op: Op,
    cmp: fn(&T, &T) -> bool,
}

/// 整数值域（时间戳、字节数）
pub type IntComparator = Comparator<i64>;
/// 字符串值域（镜像名、标签）
pub type StrComparator = Comparator<str>;

impl<T: PartialOrd + ?Sized> Comparator<T> {
    pub fn new(op: Op) -> Self {
        let cmp: fn(&T, &T) -> bool = match op {
            Op::Eq => eq::<T>,
            Op::Ne => ne::<T>,
            Op::Lt => lt::<T>,
            Op::Le => le::<T>,
            Op::Gt => gt::<T>,
            Op::Ge => ge::<T>,
        };
        Self { op, cmp }
    }

    /// Look up a comparator by operator symbol.
    pub fn lookup(symbol: &str) -> FilterResult<Self> {
        symbol.parse().map(Self::new)
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn compare(&self, first: &T, second: &T) -> bool {
        (self.cmp)(first, second)
    }
}

impl<T: ?Sized> Clone for Comparator<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Comparator<T> {}

impl<T: ?Sized> fmt::Debug for Comparator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparator").field("op", &self.op).finish()
    }
}

fn eq<T: PartialOrd + ?Sized>(first: &T, second: &T) -> bool {
    first == second
}

fn ne<T: PartialOrd + ?Sized>(first: &T, second: &T) -> bool {
    first != second
}

fn lt<T: PartialOrd + ?Sized>(first: &T, second: &T) -> bool {
    first < second
}

fn le<T: PartialOrd + ?Sized>(first: &T, second: &T) -> bool {
    first <= second
}

fn gt<T: PartialOrd + ?Sized>(first: &T, second: &T) -> bool {
    first > second
}

fn ge<T: PartialOrd + ?Sized>(first: &T, second: &T) -> bool {
    first >= second
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_comparators_follow_native_ordering() {
        let samples: [(i64, i64); 4] = [(1, 1), (1, 2), (2, 1), (-5, 3)];
        for op in Op::ALL {
            let cmp = IntComparator::new(op);
            for (a, b) in samples {
                let expected = match op {
                    Op::Eq => a == b,
                    Op::Ne => a != b,
                    Op::Lt => a < b,
                    Op::Le => a <= b,
                    Op::Gt => a > b,
                    Op::Ge => a >= b,
                };
                assert_eq!(cmp.compare(&a, &b), expected, "{a} {op} {b}");
            }
        }
    }

    #[test]
    fn test_str_comparators_follow_native_ordering() {
        let samples = [("abc", "abc"), ("abc", "abd"), ("b", "a"), ("", "x")];
        for op in Op::ALL {
            let cmp = StrComparator::new(op);
            for (a, b) in samples {
                let expected = match op {
                    Op::Eq => a == b,
                    Op::Ne => a != b,
                    Op::Lt => a < b,
                    Op::Le => a <= b,
                    Op::Gt => a > b,
                    Op::Ge => a >= b,
                };
                assert_eq!(cmp.compare(a, b), expected, "{a:?} {op} {b:?}");
            }
        }
    }

    #[test]
    fn test_eq_and_ne_int() {
        assert!(IntComparator::new(Op::Eq).compare(&1, &1));
        assert!(IntComparator::new(Op::Ne).compare(&1, &2));
    }

    #[test]
    fn test_op_symbol_round_trip() {
        for op in Op::ALL {
            assert_eq!(op.symbol().parse::<Op>().unwrap(), op);
            assert_eq!(op.to_string(), op.symbol());
        }
    }

    #[test]
    fn test_lookup_unknown_symbol_fails() {
        assert_eq!(
            IntComparator::lookup("=>").unwrap_err(),
            FilterError::UnknownOperator("=>".to_string())
        );
        assert!(StrComparator::lookup("~").is_err());
        assert_eq!(StrComparator::lookup("<=").unwrap().op(), Op::Le);
    }

    #[test]
    fn test_op_order_is_by_symbol() {
        let mut ops = Op::ALL.to_vec();
        ops.sort();
        let symbols: Vec<&str> = ops.iter().map(|op| op.symbol()).collect();
        assert_eq!(symbols, vec!["!=", "<", "<=", "=", ">", ">="]);
    }
}
