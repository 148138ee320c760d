use chrono::{DateTime, Utc};
use std::str::FromStr;

use crate::error::{FilterError, FilterResult};
use crate::expr::Filter;
use crate::op::{IntComparator, StrComparator};
use crate::resource::{split_repo_tag, Image};
use crate::size::parse_size;
use crate::validator::{created_predicate, parse_validator, Predicate, ResourceField, Validator};

pub type ImageValidator = Validator<Image>;

/// 镜像可过滤字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageField {
    Created,
    /// Repository part of any tag
    Name,
    /// Tag part of any tag
    Tag,
    Size,
}

impl ResourceField for ImageField {
    type Resource = Image;

    const KIND: &'static str = "image";
    const VALID_FIELDS: &'static str = "created, name, tag, size";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "created" => Some(Self::Created),
            "name" => Some(Self::Name),
            "tag" => Some(Self::Tag),
            "size" => Some(Self::Size),
            _ => None,
        }
    }

    fn build(self, filter: &Filter, now: DateTime<Utc>) -> FilterResult<Predicate<Image>> {
        match self {
            Self::Created => created_filter(filter, now),
            Self::Name => Ok(name_filter(filter)),
            Self::Tag => Ok(tag_filter(filter)),
            Self::Size => size_filter(filter),
        }
    }
}

impl FromStr for ImageField {
    type Err = FilterError;

    fn from_str(s: &str) -> FilterResult<Self> {
        Self::from_name(s).ok_or_else(|| FilterError::UnknownField {
            filter: s.to_string(),
            field: s.to_string(),
            kind: Self::KIND,
            valid: Self::VALID_FIELDS,
        })
    }
}

/// 根据过滤表达式构建镜像验证器
pub fn build_image_validator<S: AsRef<str>>(filters: &[S]) -> FilterResult<ImageValidator> {
    build_image_validator_at(filters, Utc::now())
}

pub fn build_image_validator_at<S: AsRef<str>>(
    filters: &[S],
    now: DateTime<Utc>,
) -> FilterResult<ImageValidator> {
    parse_validator::<ImageField, S>(filters, now)
}

/// Matches images by creation time.
pub fn created_filter(filter: &Filter, now: DateTime<Utc>) -> FilterResult<Predicate<Image>> {
    created_predicate(filter, now, |img: &Image| img.created_at)
}

/// Matches when the repository name of at least one tag satisfies the filter.
pub fn name_filter(filter: &Filter) -> Predicate<Image> {
    let cmp = StrComparator::new(filter.comparator);
    let expected = filter.value.clone();

    Box::new(move |img: &Image| {
        img.repo_tags
            .iter()
            .any(|reference| cmp.compare(split_repo_tag(reference).0, &expected))
    })
}

/// Matches when at least one tag satisfies the filter. References without a
/// tag are skipped.
pub fn tag_filter(filter: &Filter) -> Predicate<Image> {
    let cmp = StrComparator::new(filter.comparator);
    let expected = filter.value.clone();

    Box::new(move |img: &Image| {
        img.repo_tags
            .iter()
            .filter_map(|reference| split_repo_tag(reference).1)
            .any(|tag| cmp.compare(tag, &expected))
    })
}

/// Compares the image size against a size literal: `size <op> literal`.
pub fn size_filter(filter: &Filter) -> FilterResult<Predicate<Image>> {
    let size = parse_size(&filter.value)?;
    let cmp = IntComparator::new(filter.comparator);
    Ok(Box::new(move |img: &Image| cmp.compare(&img.size, &size)))
}
