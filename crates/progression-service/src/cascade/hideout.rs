use std::collections::HashMap;

use super::dto::{ChangeBatch, ModuleOutcome};
use crate::graph::HideoutGraph;
use crate::models::{HideoutModule, ModuleCompletion, ModuleId};

/// 设置藏身处模块完成状态
///
/// 取消完成某一等级时，同一设施更高等级的模块一并取消
pub fn set_module_state(
    graph: &HideoutGraph,
    modules: &HashMap<ModuleId, ModuleCompletion>,
    module: &HideoutModule,
    complete: bool,
    timestamp: i64,
) -> ModuleOutcome {
    let mut modules = modules.clone();
    let mut changes = ChangeBatch::default();

    write(&mut modules, &mut changes, &module.id, complete, timestamp);

    if !complete {
        for higher in graph.higher_levels(module) {
            write(&mut modules, &mut changes, &higher.id, false, timestamp);
        }
    }

    ModuleOutcome { modules, changes }
}

fn write(
    modules: &mut HashMap<ModuleId, ModuleCompletion>,
    changes: &mut ChangeBatch,
    id: &ModuleId,
    complete: bool,
    timestamp: i64,
) {
    let prev = modules.get(id).map(|m| m.complete).unwrap_or(false);
    if prev == complete && modules.contains_key(id) {
        return;
    }
    modules.insert(
        id.clone(),
        ModuleCompletion {
            complete,
            timestamp,
        },
    );
    if prev != complete {
        changes.record_module(id, complete);
    }
}
