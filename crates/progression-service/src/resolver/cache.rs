use std::collections::HashMap;
use std::sync::Arc;

use super::availability::{ActorAvailability, AvailabilityResolver};
use crate::graph::ProgressionGraph;
use crate::models::{ActorId, ProgressSnapshot};

struct CacheEntry {
    generation: u64,
    snapshot_version: i64,
    level: u32,
    availability: Arc<ActorAvailability>,
}

/// 按快照版本缓存的解析结果
///
/// 图代数、快照版本、有效等级三者一致时直接复用，否则重新解析
#[derive(Default)]
pub struct AvailabilityCache {
    entries: HashMap<ActorId, CacheEntry>,
}

impl AvailabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 返回解析结果以及是否命中缓存
    pub fn resolve(
        &mut self,
        graph: &ProgressionGraph,
        actor: &ActorId,
        snapshot_version: i64,
        snapshot: &ProgressSnapshot,
        level: u32,
    ) -> (Arc<ActorAvailability>, bool) {
        if let Some(entry) = self.entries.get(actor) {
            if entry.generation == graph.generation
                && entry.snapshot_version == snapshot_version
                && entry.level == level
            {
                return (entry.availability.clone(), true);
            }
        }

        let availability =
            Arc::new(AvailabilityResolver::new(&graph.tasks, snapshot.view(level)).resolve_all());
        self.entries.insert(
            actor.clone(),
            CacheEntry {
                generation: graph.generation,
                snapshot_version,
                level,
                availability: availability.clone(),
            },
        );

        (availability, false)
    }

    pub fn invalidate(&mut self, actor: &ActorId) {
        self.entries.remove(actor);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
