use serde::Serialize;

pub mod config;
pub mod container;
pub mod duration;
pub mod error;
pub mod expr;
pub mod image;
pub mod op;
pub mod purger;
pub mod resource;
pub mod runtime;
pub mod size;
pub mod status;
pub mod validator;

pub use config::Settings;
pub use container::{ContainerField, ContainerValidator, build_container_validator};
pub use duration::{CalendarOffset, parse_duration};
pub use error::{FilterError, ParseError, RemovalError};
pub use expr::Filter;
pub use image::{ImageField, ImageValidator, build_image_validator};
pub use op::{Comparator, IntComparator, Op, StrComparator};
pub use purger::{PurgeConfig, Purgeable, ResourcePurger};
pub use resource::{Container, Image};
pub use runtime::{DockerCli, DockerConfig, ResourceClient};
pub use size::parse_size;
pub use status::{StatusInfo, parse_status};
pub use validator::{Predicate, ResourceField, Validator};

/// 清理结果统计
#[derive(Debug, Clone, Serialize)]
pub struct PurgeResult {
    pub dry_run: bool,
    /// Ids removed (or, in a dry run, that would have been removed).
    pub removed: Vec<String>,
    pub reclaimed_bytes: u64,
    pub failures: Vec<RemovalError>,
    pub duration_ms: u64,
}

impl Default for PurgeResult {
    fn default() -> Self {
        Self::new(false)
    }
}

impl PurgeResult {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            removed: Vec::new(),
            reclaimed_bytes: 0,
            failures: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn add_success(&mut self, id: &str, size_freed: u64) {
        self.removed.push(id.to_string());
        self.reclaimed_bytes += size_freed;
    }

    pub fn add_failure(&mut self, failure: RemovalError) {
        self.failures.push(failure);
    }

    pub fn format_size(&self) -> String {
        format_bytes(self.reclaimed_bytes)
    }
}

/// 格式化字节大小为人类可读格式
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
