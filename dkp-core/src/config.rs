use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::runtime::DockerConfig;

/// 配置文件
///
/// ```toml
/// docker_host = "unix:///var/run/docker.sock"
/// dry_run = true
///
/// [container]
/// filters = ["exited>7d"]
///
/// [image]
/// filters = ["name=registry.example.com/team/app", "created>1m"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub docker_host: Option<String>,
    pub docker_binary: Option<PathBuf>,
    pub dry_run: bool,
    pub container: KindSettings,
    pub image: KindSettings,
}

/// 单类资源的默认过滤条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KindSettings {
    pub filters: Vec<String>,
}

impl Settings {
    /// `<config_dir>/dkp/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dkp").join("config.toml"))
    }

    /// Load an explicit file, or the default file when it exists.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("未找到配置文件，使用默认配置");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件: {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("无法解析配置文件: {}", path.display()))?;
        info!("已加载配置文件: {}", path.display());
        Ok(settings)
    }

    pub fn docker_config(&self) -> DockerConfig {
        let mut config = DockerConfig::default();
        if let Some(binary) = &self.docker_binary {
            config.binary = binary.clone();
        }
        config.host = self.docker_host.clone();
        config
    }
}
