use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{GraphCatalog, MetadataSource};
use crate::error::{ProgressError, Result};

/// 从本地 JSON 文件读取元数据目录
pub struct JsonFileMetadataSource {
    path: PathBuf,
}

impl JsonFileMetadataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MetadataSource for JsonFileMetadataSource {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load_catalog(&self) -> Result<GraphCatalog> {
        let raw = tokio::fs::read(&self.path).await.map_err(|e| {
            ProgressError::Metadata(format!("读取 {} 失败: {}", self.path.display(), e))
        })?;

        let catalog: GraphCatalog = serde_json::from_slice(&raw).map_err(|e| {
            ProgressError::Metadata(format!("解析 {} 失败: {}", self.path.display(), e))
        })?;

        debug!(
            tasks = catalog.tasks.len(),
            hideout_modules = catalog.hideout_modules.len(),
            player_levels = catalog.player_levels.len(),
            "元数据目录已读取"
        );

        Ok(catalog)
    }
}
