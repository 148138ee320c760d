use serde::Serialize;
use thiserror::Error;

use crate::op::Op;

/// 字面量解析错误（过滤表达式、时间、大小、状态）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("pattern mismatched: '{0}'")]
    Mismatched(String),

    #[error("invalid number '{value}' in '{input}'")]
    InvalidNumber { input: String, value: String },

    #[error("unsupported unit: '{0}'")]
    UnsupportedUnit(String),

    #[error("value out of range: '{0}'")]
    OutOfRange(String),
}

/// 构建过滤器时的错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("unknown operator '{0}'. Valid operators: {valid}", valid = Op::valid_symbols())]
    UnknownOperator(String),

    #[error("unsupported filter: {filter}, unknown {kind} field '{field}'. Valid fields: {valid}")]
    UnknownField {
        filter: String,
        field: String,
        kind: &'static str,
        valid: &'static str,
    },

    #[error("status is not Exited: '{0}'")]
    NotExited(String),
}

/// 单个资源删除失败，不会中断整批清理
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("can not remove {kind} {id}, reason: {reason}")]
pub struct RemovalError {
    pub kind: &'static str,
    pub id: String,
    pub reason: String,
}

pub type FilterResult<T> = std::result::Result<T, FilterError>;
