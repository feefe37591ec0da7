use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    Completion, ModuleChange, ModuleCompletion, ModuleId, TaskChange, TaskId, TaskState,
    UpdateRecord,
};

/// 触发级联的任务状态变更事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStateChange {
    pub task_id: TaskId,
    pub complete: bool,
    pub failed: bool,
    pub timestamp: i64,
}

impl TaskStateChange {
    /// 由目标状态构造事件
    pub fn from_target(task_id: impl Into<TaskId>, state: TaskState, timestamp: i64) -> Self {
        let target = state.target(timestamp);
        Self {
            task_id: task_id.into(),
            complete: target.complete,
            failed: target.failed,
            timestamp,
        }
    }

    pub fn completion(&self) -> Completion {
        Completion::new(self.complete, self.failed, self.timestamp)
    }
}

/// 一次写入过程中的状态迁移记录
///
/// 按 ID 去重，同一 ID 保留最后一次状态，输出顺序为首次出现的顺序
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeBatch {
    task_order: Vec<TaskId>,
    tasks: HashMap<TaskId, TaskState>,
    module_order: Vec<ModuleId>,
    modules: HashMap<ModuleId, bool>,
}

impl ChangeBatch {
    pub fn record_task(&mut self, id: &TaskId, state: TaskState) {
        if self.tasks.insert(id.clone(), state).is_none() {
            self.task_order.push(id.clone());
        }
    }

    pub fn record_module(&mut self, id: &ModuleId, complete: bool) {
        if self.modules.insert(id.clone(), complete).is_none() {
            self.module_order.push(id.clone());
        }
    }

    pub fn task_changes(&self) -> Vec<TaskChange> {
        self.task_order
            .iter()
            .filter_map(|id| {
                self.tasks.get(id).map(|state| TaskChange {
                    id: id.clone(),
                    state: *state,
                })
            })
            .collect()
    }

    pub fn module_changes(&self) -> Vec<ModuleChange> {
        self.module_order
            .iter()
            .filter_map(|id| {
                self.modules.get(id).map(|complete| ModuleChange {
                    id: id.clone(),
                    complete: *complete,
                })
            })
            .collect()
    }

    pub fn state_of(&self, id: &TaskId) -> Option<TaskState> {
        self.tasks.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.tasks.len() + self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.modules.is_empty()
    }

    /// 批次非空时生成更新记录
    pub fn to_update_record(&self, source: &str, at: i64) -> Option<UpdateRecord> {
        if self.is_empty() {
            return None;
        }
        Some(UpdateRecord {
            id: Uuid::new_v4(),
            at,
            source: source.to_string(),
            tasks: self.task_changes(),
            modules: self.module_changes(),
        })
    }
}

/// 任务级联结果
#[derive(Debug, Clone)]
pub struct CascadeOutcome {
    pub completions: HashMap<TaskId, Completion>,
    pub changes: ChangeBatch,
}

/// 藏身处模块变更结果
#[derive(Debug, Clone)]
pub struct ModuleOutcome {
    pub modules: HashMap<ModuleId, ModuleCompletion>,
    pub changes: ChangeBatch,
}
