//! 角色进度快照
//!
//! 快照只通过级联引擎与藏身处模块写入路径修改，解析器只读

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ids::{ModuleId, TaskId, TraderId};
use super::task::{ANY_FACTION, any_faction};

/// 任务的派生状态，优先级 failed > completed > uncompleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    Failed,
    Completed,
    Uncompleted,
}

impl TaskState {
    /// 目标状态对应的完成记录
    pub fn target(self, timestamp: i64) -> Completion {
        match self {
            TaskState::Completed => Completion::new(true, false, timestamp),
            TaskState::Failed => Completion::new(true, true, timestamp),
            TaskState::Uncompleted => Completion::new(false, false, timestamp),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Failed => "failed",
            TaskState::Completed => "completed",
            TaskState::Uncompleted => "uncompleted",
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个任务的完成记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Completion {
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub failed: bool,
    /// 显式的"已接取"标记
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub active: bool,
    /// 毫秒时间戳
    #[serde(default)]
    pub timestamp: i64,
}

impl Completion {
    pub fn new(complete: bool, failed: bool, timestamp: i64) -> Self {
        Self {
            complete,
            failed,
            active: false,
            timestamp,
        }
    }

    pub fn state(&self) -> TaskState {
        if self.failed {
            TaskState::Failed
        } else if self.complete {
            TaskState::Completed
        } else {
            TaskState::Uncompleted
        }
    }

    /// `{complete: true, failed: false}`
    pub fn is_completed(&self) -> bool {
        self.complete && !self.failed
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }
}

/// 缺失的记录视为未完成
pub fn state_of(completions: &HashMap<TaskId, Completion>, id: &TaskId) -> TaskState {
    completions
        .get(id)
        .map(Completion::state)
        .unwrap_or(TaskState::Uncompleted)
}

/// 藏身处模块完成记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleCompletion {
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub timestamp: i64,
}

/// 一次写入中记录的任务状态迁移
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskChange {
    pub id: TaskId,
    pub state: TaskState,
}

/// 一次写入中记录的模块状态迁移
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleChange {
    pub id: ModuleId,
    pub complete: bool,
}

/// 更新记录，供同步端按 `id` 去重
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub id: Uuid,
    pub at: i64,
    pub source: String,
    #[serde(default)]
    pub tasks: Vec<TaskChange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<ModuleChange>,
}

fn default_level() -> u32 {
    1
}

/// 角色进度快照（每个角色一行）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub experience: Option<u64>,
    /// 是否使用经验值推导等级
    #[serde(default)]
    pub use_experience_level: bool,
    #[serde(default = "any_faction")]
    pub faction: String,
    #[serde(default)]
    pub reputation_by_trader: HashMap<TraderId, f64>,
    #[serde(default)]
    pub completions: HashMap<TaskId, Completion>,
    #[serde(default)]
    pub hideout_modules: HashMap<ModuleId, ModuleCompletion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<UpdateRecord>,
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self {
            level: default_level(),
            experience: None,
            use_experience_level: false,
            faction: ANY_FACTION.to_string(),
            reputation_by_trader: HashMap::new(),
            completions: HashMap::new(),
            hideout_modules: HashMap::new(),
            last_update: None,
        }
    }
}

impl ProgressSnapshot {
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_faction(mut self, faction: impl Into<String>) -> Self {
        self.faction = faction.into();
        self
    }

    pub fn with_reputation(mut self, trader: impl Into<TraderId>, value: f64) -> Self {
        self.reputation_by_trader.insert(trader.into(), value);
        self
    }

    pub fn with_state(mut self, task: impl Into<TaskId>, state: TaskState) -> Self {
        self.completions.insert(task.into(), state.target(0));
        self
    }

    pub fn task_state(&self, id: &TaskId) -> TaskState {
        state_of(&self.completions, id)
    }

    pub fn is_module_complete(&self, id: &ModuleId) -> bool {
        self.hideout_modules
            .get(id)
            .map(|m| m.complete)
            .unwrap_or(false)
    }

    /// 以给定的有效等级构造只读视图
    pub fn view(&self, level: u32) -> ActorView<'_> {
        ActorView {
            level,
            faction: &self.faction,
            reputation: &self.reputation_by_trader,
            completions: &self.completions,
        }
    }
}

/// 解析器看到的角色输入
#[derive(Debug, Clone, Copy)]
pub struct ActorView<'a> {
    pub level: u32,
    pub faction: &'a str,
    pub reputation: &'a HashMap<TraderId, f64>,
    pub completions: &'a HashMap<TaskId, Completion>,
}

impl ActorView<'_> {
    pub fn reputation_with(&self, trader: &TraderId) -> f64 {
        self.reputation.get(trader).copied().unwrap_or(0.0)
    }
}
