use std::collections::HashMap;

use crate::graph::HideoutGraph;
use crate::models::{HideoutModule, ModuleId, ProgressSnapshot};

/// 藏身处模块可用性
///
/// 模块可建造的条件：本身未完成、上一级已完成、每个设施等级需求都由该设施
/// 某个已完成且等级不低于要求的模块满足。未知设施视为满足
pub struct HideoutResolver;

impl HideoutResolver {
    pub fn resolve(graph: &HideoutGraph, snapshot: &ProgressSnapshot) -> HashMap<ModuleId, bool> {
        graph
            .modules()
            .map(|m| (m.id.clone(), Self::is_available(graph, m, snapshot)))
            .collect()
    }

    pub fn is_available(
        graph: &HideoutGraph,
        module: &HideoutModule,
        snapshot: &ProgressSnapshot,
    ) -> bool {
        if snapshot.is_module_complete(&module.id) {
            return false;
        }

        if let Some(prev) = graph.predecessor(module) {
            if !snapshot.is_module_complete(&prev.id) {
                return false;
            }
        }

        module.station_level_requirements.iter().all(|req| {
            !graph.has_station(&req.station_id)
                || graph
                    .station_modules(&req.station_id)
                    .any(|m| m.level >= req.level && snapshot.is_module_complete(&m.id))
        })
    }
}
