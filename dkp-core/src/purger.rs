use anyhow::Result;
use std::time::Instant;
use tracing::{debug, error, info};

use crate::PurgeResult;
use crate::container::ContainerValidator;
use crate::error::RemovalError;
use crate::image::ImageValidator;
use crate::resource::{Container, Image};
use crate::runtime::ResourceClient;
use crate::validator::Validator;

/// 可被清理的资源
pub trait Purgeable {
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Human readable label for logs and listings.
    fn label(&self) -> String;

    /// Bytes expected to be freed by removing this resource.
    fn reclaimable(&self) -> u64 {
        0
    }
}

impl Purgeable for Container {
    const KIND: &'static str = "container";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        format!("{} ({})", self.display_name(), self.status)
    }
}

impl Purgeable for Image {
    const KIND: &'static str = "image";

    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> String {
        self.display_name()
    }

    fn reclaimable(&self) -> u64 {
        u64::try_from(self.size).unwrap_or(0)
    }
}

/// 清理器配置
#[derive(Debug, Clone, Default)]
pub struct PurgeConfig {
    /// Only report what would be removed.
    pub dry_run: bool,
}

/// 资源清理器
pub struct ResourcePurger<C> {
    client: C,
    config: PurgeConfig,
}

impl<C: ResourceClient> ResourcePurger<C> {
    /// 创建新的清理器
    pub fn new(client: C, config: PurgeConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &PurgeConfig {
        &self.config
    }

    /// 列出满足所有过滤条件的容器，保持列出顺序
    pub fn select_containers(&self, validator: &ContainerValidator) -> Result<Vec<Container>> {
        let containers = self.client.list_containers()?;
        Ok(select(containers, validator))
    }

    /// 列出满足所有过滤条件的镜像，保持列出顺序
    pub fn select_images(&self, validator: &ImageValidator) -> Result<Vec<Image>> {
        let images = self.client.list_images()?;
        Ok(select(images, validator))
    }

    /// 删除容器，单个失败不影响其余容器
    pub fn remove_containers(&self, containers: &[Container]) -> PurgeResult {
        self.remove_all(containers, |id| self.client.remove_container(id))
    }

    /// 删除镜像，单个失败不影响其余镜像
    pub fn remove_images(&self, images: &[Image]) -> PurgeResult {
        self.remove_all(images, |id| self.client.remove_image(id))
    }

    pub fn purge_containers(&self, validator: &ContainerValidator) -> Result<PurgeResult> {
        let selected = self.select_containers(validator)?;
        Ok(self.remove_containers(&selected))
    }

    pub fn purge_images(&self, validator: &ImageValidator) -> Result<PurgeResult> {
        let selected = self.select_images(validator)?;
        Ok(self.remove_images(&selected))
    }

    fn remove_all<R, F>(&self, resources: &[R], remove: F) -> PurgeResult
    where
        R: Purgeable,
        F: Fn(&str) -> Result<()>,
    {
        let start_time = Instant::now();
        let mut result = PurgeResult::new(self.config.dry_run);

        info!("开始清理 {} 个{}", resources.len(), R::KIND);

        for resource in resources {
            if self.config.dry_run {
                info!("[DryRun] 将删除 {} {} {}", R::KIND, resource.id(), resource.label());
                result.add_success(resource.id(), resource.reclaimable());
                continue;
            }

            match remove(resource.id()) {
                Ok(()) => {
                    info!("已删除 {} {} {}", R::KIND, resource.id(), resource.label());
                    result.add_success(resource.id(), resource.reclaimable());
                }
                Err(e) => {
                    let failure = RemovalError {
                        kind: R::KIND,
                        id: resource.id().to_string(),
                        reason: format!("{e:#}"),
                    };
                    error!("{}", failure);
                    result.add_failure(failure);
                }
            }
        }

        result.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "清理完成: 成功 {} 个，失败 {} 个，释放空间 {}，耗时 {}ms",
            result.removed.len(),
            result.failures.len(),
            result.format_size(),
            result.duration_ms
        );

        result
    }
}

fn select<R: Purgeable>(resources: Vec<R>, validator: &Validator<R>) -> Vec<R> {
    let listed = resources.len();
    let selected: Vec<R> = resources
        .into_iter()
        .filter(|resource| {
            let matched = validator.satisfied(resource);
            debug!(
                "{} {} {}",
                R::KIND,
                resource.id(),
                if matched { "满足过滤条件" } else { "不满足过滤条件，保留" }
            );
            matched
        })
        .collect();

    info!("共 {} 个{}，{} 个满足过滤条件", listed, R::KIND, selected.len());
    selected
}
