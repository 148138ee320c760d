use chrono::{DateTime, Utc};
use std::str::FromStr;
use tracing::debug;

use crate::error::{FilterError, FilterResult};
use crate::expr::Filter;
use crate::op::IntComparator;
use crate::resource::Container;
use crate::status::parse_status;
use crate::validator::{
    age_threshold, created_predicate, parse_validator, Predicate, ResourceField, Validator,
};

pub type ContainerValidator = Validator<Container>;

/// 容器可过滤字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerField {
    /// `created<op><age>`
    Created,
    /// `exited<op><age>`, only matches exited containers
    Exited,
}

impl ResourceField for ContainerField {
    type Resource = Container;

    const KIND: &'static str = "container";
    const VALID_FIELDS: &'static str = "created, exited";

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "created" => Some(Self::Created),
            "exited" => Some(Self::Exited),
            _ => None,
        }
    }

    fn build(self, filter: &Filter, now: DateTime<Utc>) -> FilterResult<Predicate<Container>> {
        match self {
            Self::Created => created_filter(filter, now),
            Self::Exited => exited_filter(filter, now),
        }
    }
}

impl FromStr for ContainerField {
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

/// 根据过滤表达式构建容器验证器
pub fn build_container_validator<S: AsRef<str>>(filters: &[S]) -> FilterResult<ContainerValidator> {
    build_container_validator_at(filters, Utc::now())
}

pub fn build_container_validator_at<S: AsRef<str>>(
    filters: &[S],
    now: DateTime<Utc>,
) -> FilterResult<ContainerValidator> {
    parse_validator::<ContainerField, S>(filters, now)
}

/// Matches containers by creation time.
pub fn created_filter(filter: &Filter, now: DateTime<Utc>) -> FilterResult<Predicate<Container>> {
    created_predicate(filter, now, |ctn: &Container| ctn.created_at)
}

/// Matches exited containers by the time they exited.
pub fn exited_filter(filter: &Filter, now: DateTime<Utc>) -> FilterResult<Predicate<Container>> {
    let threshold = age_threshold(filter, now)?;
    let cmp = IntComparator::new(filter.comparator);

    Ok(Box::new(move |ctn: &Container| {
        let status = match parse_status(&ctn.status) {
            Ok(status) => status,
            Err(e) => {
                debug!("容器 {} 状态无法解析: {}", ctn.short_id(), e);
                return false;
            }
        };
        if !status.is_exited() {
            return false;
        }
        match status.exited_at(now) {
            Ok(exited_at) => cmp.compare(&threshold, &exited_at.timestamp()),
            Err(e) => {
                debug!("容器 {} 退出时间无法计算: {}", ctn.short_id(), e);
                false
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::Op;
    use chrono::{Days, Months, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 10, 9, 0, 0).unwrap()
    }

    fn created(at: DateTime<Utc>) -> Container {
        Container {
            id: "c0ffee".to_string(),
            created_at: at.timestamp(),
            ..Default::default()
        }
    }

    fn with_status(status: &str) -> Container {
        Container {
            id: "c0ffee".to_string(),
            status: status.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_created_filter() {
        let f = Filter::new("created", Op::Gt, "10d");
        let predicate = created_filter(&f, now()).unwrap();

        let yesterday = now() - Days::new(1);
        assert!(!predicate(&created(yesterday)), "created 1d ago");

        let month_and_day = yesterday - Months::new(1);
        assert!(predicate(&created(month_and_day)), "created 1m1d ago");
    }

    #[test]
    fn test_created_filter_with_wall_clock() {
        let validator = build_container_validator(&["created>10d"]).unwrap();
        let yesterday = Utc::now() - Days::new(1);
        assert!(!validator.satisfied(&created(yesterday)));
        assert!(validator.satisfied(&created(yesterday - Months::new(1))));
    }

    #[test]
    fn test_exited_filter() {
        let f = Filter::new("exited", Op::Gt, "1m2d");
        let predicate = exited_filter(&f, now()).unwrap();

        assert!(predicate(&with_status("Exited (143) 20 weeks ago")));
        assert!(!predicate(&with_status("Exited (143) 2 days ago")));
        assert!(!predicate(&with_status("Up 2 seconds")));
        assert!(!predicate(&with_status("")));
    }

    #[test]
    fn test_exited_filter_less_than() {
        let f = Filter::new("exited", Op::Lt, "1d");
        let predicate = exited_filter(&f, now()).unwrap();

        assert!(predicate(&with_status("Exited (0) About an hour ago")));
        assert!(predicate(&with_status("Exited (0) 5 hours ago")));
        assert!(!predicate(&with_status("Exited (0) 3 days ago")));
        assert!(!predicate(&with_status("Up About an hour")));
    }

    #[test]
    fn test_created_and_exited_combined() {
        let validator =
            build_container_validator_at(&["created>30d", "exited>7d"], now()).unwrap();
        assert_eq!(validator.len(), 2);

        let mut ctn = with_status("Exited (1) 2 weeks ago");
        ctn.created_at = (now() - Months::new(2)).timestamp();
        assert!(validator.satisfied(&ctn));

        ctn.created_at = (now() - Days::new(3)).timestamp();
        assert!(!validator.satisfied(&ctn));
    }

    #[test]
    fn test_invalid_duration_aborts_build() {
        let err = build_container_validator_at(&["created>10"], now()).unwrap_err();
        assert!(matches!(err, FilterError::Parse(_)));
    }

    #[test]
    fn test_unknown_field_is_reported() {
        let err = build_container_validator_at(&["created>1d", "size>1g"], now()).unwrap_err();
        match err {
            FilterError::UnknownField {
                filter,
                field,
                kind,
                ..
            } => {
                assert_eq!(filter, "size>1g");
                assert_eq!(field, "size");
                assert_eq!(kind, "container");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_no_filters_never_match() {
        let validator = build_container_validator_at::<&str>(&[], now()).unwrap();
        assert!(!validator.satisfied(&with_status("Exited (0) 3 years ago")));
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("created".parse::<ContainerField>().unwrap(), ContainerField::Created);
        assert_eq!("exited".parse::<ContainerField>().unwrap(), ContainerField::Exited);
        assert!("name".parse::<ContainerField>().is_err());
    }
}
