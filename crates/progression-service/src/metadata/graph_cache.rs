use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::info;

use super::MetadataSource;
use crate::error::Result;
use crate::graph::ProgressionGraph;

#[derive(Default)]
struct CachedGraph {
    graph: Option<Arc<ProgressionGraph>>,
    cached_at: Option<Instant>,
}

/// 进度图缓存
///
/// TTL 内直接返回缓存的图；过期后重新从元数据来源加载，并分配新的代数
pub struct GraphCache {
    source: Arc<dyn MetadataSource>,
    ttl: Duration,
    cache: RwLock<CachedGraph>,
    generation: AtomicU64,
}

impl GraphCache {
    pub fn new(source: Arc<dyn MetadataSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            cache: RwLock::new(CachedGraph::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub async fn get_or_refresh(&self) -> Result<Arc<ProgressionGraph>> {
        // 快速路径：缓存仍有效
        {
            let cache = self.cache.read().await;
            if let (Some(graph), Some(cached_at)) = (&cache.graph, cache.cached_at) {
                if cached_at.elapsed() < self.ttl {
                    return Ok(graph.clone());
                }
            }
        }

        self.refresh().await
    }

    /// 强制重新加载
    pub async fn refresh(&self) -> Result<Arc<ProgressionGraph>> {
        let catalog = self.source.load_catalog().await?;
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let graph = Arc::new(ProgressionGraph::from_catalog(catalog, generation));

        let mut cache = self.cache.write().await;
        cache.graph = Some(graph.clone());
        cache.cached_at = Some(Instant::now());

        info!(
            generation,
            tasks = graph.tasks.len(),
            hideout_modules = graph.hideout.len(),
            "进度图缓存已刷新"
        );
        Ok(graph)
    }
}
