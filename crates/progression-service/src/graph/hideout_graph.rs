use std::collections::HashMap;

use tracing::warn;

use crate::models::{HideoutModule, ModuleId, StationId};

/// 藏身处模块图，按设施分组并按等级排序
#[derive(Debug, Default, Clone)]
pub struct HideoutGraph {
    modules: HashMap<ModuleId, HideoutModule>,
    by_station: HashMap<StationId, Vec<ModuleId>>,
}

impl HideoutGraph {
    pub fn from_modules(modules: Vec<HideoutModule>) -> Self {
        let mut graph = Self::default();

        for module in modules {
            if graph.modules.contains_key(&module.id) {
                warn!(module_id = %module.id, "重复的藏身处模块 ID，保留首次出现的定义");
                continue;
            }
            graph
                .by_station
                .entry(module.station_id.clone())
                .or_default()
                .push(module.id.clone());
            graph.modules.insert(module.id.clone(), module);
        }

        let modules = &graph.modules;
        for ids in graph.by_station.values_mut() {
            ids.sort_by_key(|id| modules.get(id).map(|m| m.level).unwrap_or(0));
        }

        graph
    }

    pub fn get(&self, id: &ModuleId) -> Option<&HideoutModule> {
        self.modules.get(id)
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.contains_key(id)
    }

    pub fn modules(&self) -> impl Iterator<Item = &HideoutModule> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// 某设施的全部模块，按等级升序
    pub fn station_modules(&self, station: &StationId) -> impl Iterator<Item = &HideoutModule> {
        self.by_station
            .get(station)
            .into_iter()
            .flatten()
            .filter_map(|id| self.modules.get(id))
    }

    pub fn has_station(&self, station: &StationId) -> bool {
        self.by_station.contains_key(station)
    }

    /// 同一设施的上一级模块
    pub fn predecessor(&self, module: &HideoutModule) -> Option<&HideoutModule> {
        if module.level == 0 {
            return None;
        }
        self.station_modules(&module.station_id)
            .find(|m| m.level == module.level - 1)
    }

    /// 同一设施中等级更低的模块
    pub fn lower_levels<'a>(
        &'a self,
        module: &'a HideoutModule,
    ) -> impl Iterator<Item = &'a HideoutModule> + 'a {
        self.station_modules(&module.station_id)
            .filter(move |m| m.level < module.level)
    }

    /// 同一设施中等级更高的模块
    pub fn higher_levels<'a>(
        &'a self,
        module: &'a HideoutModule,
    ) -> impl Iterator<Item = &'a HideoutModule> + 'a {
        self.station_modules(&module.station_id)
            .filter(move |m| m.level > module.level)
    }
}
