//! 服务层请求 / 响应 DTO

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::invalidation::Invalidation;
use crate::models::{ActorId, ModuleId, ProgressSnapshot, TaskId, TaskState, UpdateRecord};
use crate::resolver::ActorAvailability;

/// 单任务状态更新请求
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskRequest {
    pub state: TaskState,
}

/// 批量更新中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskUpdateItem {
    pub id: TaskId,
    pub state: TaskState,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateModuleRequest {
    pub complete: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamAvailabilityRequest {
    pub primary: ActorId,
    #[serde(default)]
    pub teammates: Vec<ActorId>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub actor_id: ActorId,
    pub version: i64,
    pub progress: ProgressSnapshot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskResponse {
    pub actor_id: ActorId,
    pub task_id: TaskId,
    pub state: TaskState,
    pub version: i64,
    /// 本次写入产生的更新记录，无状态迁移时为空
    pub update: Option<UpdateRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResponse {
    pub actor_id: ActorId,
    pub accepted: Vec<TaskUpdateItem>,
    pub version: i64,
    pub update: Option<UpdateRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModuleResponse {
    pub actor_id: ActorId,
    pub module_id: ModuleId,
    pub complete: bool,
    pub version: i64,
    pub update: Option<UpdateRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub actor_id: ActorId,
    pub version: i64,
    /// 解析时使用的有效等级
    pub level: u32,
    pub tasks: ActorAvailability,
    pub hideout: HashMap<ModuleId, bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationResponse {
    pub actor_id: ActorId,
    pub version: i64,
    pub findings: Vec<Invalidation>,
}
