//! 仓储 Trait 定义
//!
//! 服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;

use super::ProgressRow;
use crate::error::Result;
use crate::models::{ActorId, ProgressSnapshot};

/// 角色进度仓储接口
///
/// 每个角色一行，写入为整行原子替换，后写入者覆盖先写入者
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressRepositoryTrait: Send + Sync {
    async fn get_progress(&self, actor_id: &ActorId) -> Result<Option<ProgressRow>>;

    async fn get_progress_many(&self, actor_ids: &[ActorId]) -> Result<Vec<ProgressRow>>;

    /// 替换整行快照，返回写入后的版本号
    async fn replace_progress(&self, actor_id: &ActorId, snapshot: &ProgressSnapshot)
    -> Result<i64>;
}
