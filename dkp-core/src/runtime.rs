//! Listing and removing resources through the `docker` command line.

use anyhow::{Context, Result};
use chrono::DateTime;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

use crate::resource::{Container, Image};

/// 容器运行时客户端：列出与删除资源
pub trait ResourceClient {
    fn list_containers(&self) -> Result<Vec<Container>>;

    fn list_images(&self) -> Result<Vec<Image>>;

    fn remove_container(&self, id: &str) -> Result<()>;

    fn remove_image(&self, id: &str) -> Result<()>;
}

impl<C: ResourceClient + ?Sized> ResourceClient for &C {
    fn list_containers(&self) -> Result<Vec<Container>> {
        (**self).list_containers()
    }

    fn list_images(&self) -> Result<Vec<Image>> {
        (**self).list_images()
    }

    fn remove_container(&self, id: &str) -> Result<()> {
        (**self).remove_container(id)
    }

    fn remove_image(&self, id: &str) -> Result<()> {
        (**self).remove_image(id)
    }
}

/// docker 命令配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerConfig {
    pub binary: PathBuf,
    /// Daemon address passed as `-H`; the CLI default is used when unset.
    pub host: Option<String>,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("docker"),
            host: None,
        }
    }
}

// `docker image inspect` is called with at most this many ids at once.
const INSPECT_BATCH: usize = 100;

/// [`ResourceClient`] backed by the `docker` binary
#[derive(Debug, Clone, Default)]
pub struct DockerCli {
    config: DockerConfig,
}

impl DockerCli {
    pub fn new(config: DockerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DockerConfig {
        &self.config
    }

    /// 检查docker命令是否可用
    pub fn check_available(&self) -> bool {
        self.command()
            .arg("version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.config.binary);
        if let Some(host) = &self.config.host {
            cmd.arg("-H").arg(host);
        }
        cmd
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        debug!("执行 docker {}", args.join(" "));
        let output = self
            .command()
            .args(args)
            .output()
            .with_context(|| format!("执行docker命令失败: {:?}", self.config.binary))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("docker {} 失败: {}", args.join(" "), stderr.trim());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl ResourceClient for DockerCli {
    fn list_containers(&self) -> Result<Vec<Container>> {
        let stdout = self.run(&["ps", "-a", "--no-trunc", "--format", "{{json .}}"])?;
        parse_ps_output(&stdout)
    }

    fn list_images(&self) -> Result<Vec<Image>> {
        let stdout = self.run(&["image", "ls", "-a", "-q", "--no-trunc"])?;

        let mut seen = HashSet::new();
        let ids: Vec<&str> = stdout
            .lines()
            .map(str::trim)
            .filter(|id| !id.is_empty() && seen.insert(*id))
            .collect();

        let mut images = Vec::with_capacity(ids.len());
        for batch in ids.chunks(INSPECT_BATCH) {
            let mut args = vec!["image", "inspect"];
            args.extend_from_slice(batch);
            images.extend(parse_image_inspect(&self.run(&args)?)?);
        }
        Ok(images)
    }

    fn remove_container(&self, id: &str) -> Result<()> {
        self.run(&["rm", id]).map(|_| ())
    }

    fn remove_image(&self, id: &str) -> Result<()> {
        self.run(&["rmi", id]).map(|_| ())
    }
}

#[derive(Debug, Deserialize)]
struct PsLine {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Names", default)]
    names: String,
    #[serde(rename = "Image", default)]
    image: String,
    /// `2024-01-15 10:30:00 +0000 UTC`
    #[serde(rename = "CreatedAt")]
    created_at: String,
    #[serde(rename = "Status", default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct InspectedImage {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "RepoTags", default)]
    repo_tags: Option<Vec<String>>,
    /// RFC 3339
    #[serde(rename = "Created")]
    created: String,
    #[serde(rename = "Size", default)]
    size: i64,
}

/// Parse `docker ps --format '{{json .}}'` output, one object per line.
pub(crate) fn parse_ps_output(stdout: &str) -> Result<Vec<Container>> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| -> Result<Container> {
            let ps: PsLine = serde_json::from_str(line)
                .with_context(|| format!("无法解析容器信息: {line}"))?;
            Ok(Container {
                created_at: parse_ps_created(&ps.created_at)?,
                id: ps.id,
                names: ps
                    .names
                    .split(',')
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .collect(),
                image: ps.image,
                status: ps.status,
            })
        })
        .collect()
}

/// Parse the JSON array printed by `docker image inspect`.
pub(crate) fn parse_image_inspect(stdout: &str) -> Result<Vec<Image>> {
    let inspected: Vec<InspectedImage> =
        serde_json::from_str(stdout).context("无法解析镜像信息")?;

    inspected
        .into_iter()
        .map(|img| -> Result<Image> {
            let created_at = DateTime::parse_from_rfc3339(&img.created)
                .with_context(|| format!("无效的镜像创建时间: {}", img.created))?
                .timestamp();
            Ok(Image {
                id: img.id,
                created_at,
                size: img.size,
                repo_tags: img.repo_tags.unwrap_or_default(),
            })
        })
        .collect()
}

// The trailing zone abbreviation is redundant with the numeric offset.
fn parse_ps_created(value: &str) -> Result<i64> {
    let without_zone: Vec<&str> = value.split_whitespace().take(3).collect();
    let stamp = without_zone.join(" ");
    DateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M:%S %z")
        .map(|t| t.timestamp())
        .with_context(|| format!("无效的容器创建时间: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ps_output() {
        let stdout = concat!(
            r#"{"Command":"\"nginx -g 'daemon of…\"","CreatedAt":"2024-01-15 10:30:00 +0000 UTC","ID":"4f2a1b","Image":"nginx:latest","Names":"web,web-alias","State":"exited","Status":"Exited (0) 2 days ago"}"#,
            "\n",
            "\n",
            r#"{"CreatedAt":"2024-01-16 08:00:00 +0800 CST","ID":"9c8d7e","Image":"redis:7","Names":"cache","Status":"Up 3 hours"}"#,
            "\n",
        );

        let containers = parse_ps_output(stdout).unwrap();
        assert_eq!(containers.len(), 2);

        assert_eq!(containers[0].id, "4f2a1b");
        assert_eq!(containers[0].names, vec!["web", "web-alias"]);
        assert_eq!(containers[0].image, "nginx:latest");
        assert_eq!(containers[0].created_at, 1_705_314_600);
        assert_eq!(containers[0].status, "Exited (0) 2 days ago");

        assert_eq!(containers[1].created_at, 1_705_363_200);
        assert_eq!(containers[1].status, "Up 3 hours");
    }

    #[test]
    fn test_parse_ps_output_rejects_bad_time() {
        let stdout = r#"{"CreatedAt":"yesterday","ID":"1","Status":"Created"}"#;
        assert!(parse_ps_output(stdout).is_err());
    }

    #[test]
    fn test_parse_image_inspect() {
        let stdout = r#"[
            {
                "Id": "sha256:aaaa",
                "RepoTags": ["nginx:latest", "nginx:1.25"],
                "Created": "2024-01-15T10:30:00.123456789Z",
                "Size": 187654321
            },
            {
                "Id": "sha256:bbbb",
                "RepoTags": null,
                "Created": "2023-12-01T00:00:00+02:00",
                "Size": 1024
            }
        ]"#;

        let images = parse_image_inspect(stdout).unwrap();
        assert_eq!(images.len(), 2);

        assert_eq!(images[0].id, "sha256:aaaa");
        assert_eq!(images[0].repo_tags, vec!["nginx:latest", "nginx:1.25"]);
        assert_eq!(images[0].created_at, 1_705_314_600);
        assert_eq!(images[0].size, 187_654_321);

        assert!(images[1].repo_tags.is_empty());
        assert_eq!(images[1].created_at, 1_701_381_600);
    }

    #[test]
    fn test_docker_config_default() {
        let config = DockerConfig::default();
        assert_eq!(config.binary, PathBuf::from("docker"));
        assert!(config.host.is_none());
    }

    #[test]
    fn test_missing_binary_fails() {
        let cli = DockerCli::new(DockerConfig {
            binary: PathBuf::from("/nonexistent/dkp-test-docker"),
            host: None,
        });
        assert!(!cli.check_available());
        assert!(cli.list_containers().is_err());
    }
}
