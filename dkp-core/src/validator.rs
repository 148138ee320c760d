//! AND-composition of per-field predicates.
//!
//! A [`Validator`] is built once per purge run from the user's filter
//! expressions. It never matches when it holds no predicates, so a run
//! without filters removes nothing.

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::debug;

use crate::duration::parse_duration;
use crate::error::{FilterError, FilterResult};
use crate::expr::Filter;
use crate::op::IntComparator;

/// 单个资源上的判定函数
pub type Predicate<R> = Box<dyn Fn(&R) -> bool + Send + Sync>;

/// A filterable field of one resource kind.
pub trait ResourceField: Sized + Copy + fmt::Debug {
    type Resource: 'static;

    /// Resource kind, used in diagnostics.
    const KIND: &'static str;
    /// Comma separated field names, used in diagnostics.
    const VALID_FIELDS: &'static str;

    fn from_name(name: &str) -> Option<Self>;

    fn build(self, filter: &Filter, now: DateTime<Utc>) -> FilterResult<Predicate<Self::Resource>>;

    fn resolve(filter: &Filter) -> FilterResult<Self> {
        Self::from_name(&filter.field).ok_or_else(|| FilterError::UnknownField {
            filter: filter.source.clone(),
            field: filter.field.clone(),
            kind: Self::KIND,
            valid: Self::VALID_FIELDS,
        })
    }
}

/// 验证器：所有判定都满足时资源才会被清理
pub struct Validator<R> {
    predicates: Vec<Predicate<R>>,
}

impl<R> Validator<R> {
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    pub fn push<F>(&mut self, predicate: F)
    where
        F: Fn(&R) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Box::new(predicate));
    }

    pub fn push_boxed(&mut self, predicate: Predicate<R>) {
        self.predicates.push(predicate);
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Whether `resource` passes every predicate. Always false when empty.
    pub fn satisfied(&self, resource: &R) -> bool {
        if self.predicates.is_empty() {
            return false;
        }
        self.predicates.iter().all(|predicate| predicate(resource))
    }
}

impl<R> Default for Validator<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for Validator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

/// Build a validator for the resource kind of `F` from parsed filters.
pub fn build_validator<F: ResourceField>(
    filters: &[Filter],
    now: DateTime<Utc>,
) -> FilterResult<Validator<F::Resource>> {
    let mut validator = Validator::new();
    for filter in filters {
        let field = F::resolve(filter)?;
        validator.push_boxed(field.build(filter, now)?);
        debug!("{} 过滤条件: {} ({:?})", F::KIND, filter.source, field);
    }
    Ok(validator)
}

/// Parse raw expressions and build a validator from them.
pub fn parse_validator<F: ResourceField, S: AsRef<str>>(
    raws: &[S],
    now: DateTime<Utc>,
) -> FilterResult<Validator<F::Resource>> {
    build_validator::<F>(&Filter::parse_all(raws)?, now)
}

/// `threshold <op> created_at`, with the threshold taken from an age literal.
pub(crate) fn created_predicate<R: 'static>(
    filter: &Filter,
    now: DateTime<Utc>,
    created_at: fn(&R) -> i64,
) -> FilterResult<Predicate<R>> {
    let threshold = age_threshold(filter, now)?;
    let cmp = IntComparator::new(filter.comparator);
    Ok(Box::new(move |resource| {
        cmp.compare(&threshold, &created_at(resource))
    }))
}

pub(crate) fn age_threshold(filter: &Filter, now: DateTime<Utc>) -> FilterResult<i64> {
    let offset = parse_duration(&filter.value)?;
    Ok(offset.threshold_from(now)?.timestamp())
}
