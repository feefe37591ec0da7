//! 任务元数据
//!
//! 元数据目录的来源抽象、JSON 文件实现以及带 TTL 的进度图缓存

mod graph_cache;
mod json_source;

pub use graph_cache::GraphCache;
pub use json_source::JsonFileMetadataSource;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::task::null_as_default;
use crate::models::{HideoutModule, PlayerLevel, Task, TaskId, TraderId};

/// 元数据目录
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphCatalog {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tasks: Vec<Task>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hideout_modules: Vec<HideoutModule>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub player_levels: Vec<PlayerLevel>,
    /// 额外的商人解锁任务映射，与任务自带的 `traderUnlock` 合并
    #[serde(default, deserialize_with = "null_as_default")]
    pub trader_unlocks: HashMap<TraderId, Vec<TaskId>>,
}

/// 元数据来源接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn load_catalog(&self) -> Result<GraphCatalog>;
}
