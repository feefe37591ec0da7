//! 数据访问层

mod progress_repo;
mod traits;

pub use progress_repo::ProgressRepository;
pub use traits::ProgressRepositoryTrait;

#[cfg(test)]
pub use traits::MockProgressRepositoryTrait;

use chrono::{DateTime, Utc};

use crate::models::{ActorId, ProgressSnapshot};

/// 一行角色进度
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRow {
    pub actor_id: ActorId,
    pub snapshot: ProgressSnapshot,
    /// 单调递增的写入版本，0 表示尚未持久化
    pub version: i64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProgressRow {
    pub fn empty(actor_id: ActorId) -> Self {
        Self {
            actor_id,
            snapshot: ProgressSnapshot::default(),
            version: 0,
            updated_at: None,
        }
    }
}
