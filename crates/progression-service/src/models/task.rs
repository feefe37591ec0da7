//! 任务图实体定义
//!
//! 字段命名与元数据目录保持一致（camelCase），可选列表允许缺失或为 null

use serde::{Deserialize, Deserializer, Serialize};

use super::ids::{TaskId, TraderId};

/// 不限阵营
pub const ANY_FACTION: &str = "Any";

pub(crate) fn any_faction() -> String {
    ANY_FACTION.to_string()
}

/// 将 null 视为默认值
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 任务前置需求中要求的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementStatus {
    /// 前置任务已完成
    Complete,
    /// 前置任务已接取
    Active,
    /// 前置任务已失败
    Failed,
}

impl std::str::FromStr for RequirementStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "complete" => Ok(Self::Complete),
            "active" => Ok(Self::Active),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("unknown requirement status: {}", s)),
        }
    }
}

/// 无法识别的状态字符串直接忽略
fn lenient_statuses<'de, D>(deserializer: D) -> Result<Vec<RequirementStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<String>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect())
}

/// 商人引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraderRef {
    pub id: TraderId,
    #[serde(default)]
    pub normalized_name: String,
}

impl TraderRef {
    pub fn new(id: impl Into<TraderId>) -> Self {
        Self {
            id: id.into(),
            normalized_name: String::new(),
        }
    }
}

/// 商人声望需求
///
/// `value >= 0` 表示声望不低于该值，负值表示声望不高于该值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraderRequirement {
    pub trader_id: TraderId,
    pub value: i32,
}

/// 前置任务需求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequirement {
    pub task_id: TaskId,
    #[serde(default, deserialize_with = "lenient_statuses")]
    pub status: Vec<RequirementStatus>,
}

impl TaskRequirement {
    pub fn requires(&self, status: RequirementStatus) -> bool {
        self.status.contains(&status)
    }
}

/// 失败触发需求：引用的任务失败后，本任务不可再接取
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedRequirement {
    pub task_id: TaskId,
}

/// 任务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub min_player_level: Option<u32>,
    #[serde(default = "any_faction", deserialize_with = "faction_or_any")]
    pub faction_name: String,
    /// 发布任务的商人
    #[serde(default)]
    pub trader: Option<TraderRef>,
    /// 完成本任务会解锁的商人
    #[serde(default)]
    pub trader_unlock: Option<TraderRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub trader_requirements: Vec<TraderRequirement>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub task_requirements: Vec<TaskRequirement>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub failed_requirements: Vec<FailedRequirement>,
    /// 互斥任务：完成其中之一，其余视为因互斥而失败
    #[serde(default, deserialize_with = "null_as_default")]
    pub alternatives: Vec<TaskId>,
    #[serde(default)]
    pub experience: Option<u64>,
}

fn faction_or_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|s| !s.is_empty())
        .unwrap_or_else(any_faction))
}

impl Task {
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            min_player_level: None,
            faction_name: any_faction(),
            trader: None,
            trader_unlock: None,
            trader_requirements: Vec::new(),
            task_requirements: Vec::new(),
            failed_requirements: Vec::new(),
            alternatives: Vec::new(),
            experience: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_min_level(mut self, level: u32) -> Self {
        self.min_player_level = Some(level);
        self
    }

    pub fn with_faction(mut self, faction: impl Into<String>) -> Self {
        self.faction_name = faction.into();
        self
    }

    pub fn with_trader(mut self, trader: impl Into<TraderId>) -> Self {
        self.trader = Some(TraderRef::new(trader));
        self
    }

    pub fn unlocks_trader(mut self, trader: impl Into<TraderId>) -> Self {
        self.trader_unlock = Some(TraderRef::new(trader));
        self
    }

    pub fn with_reputation(mut self, trader: impl Into<TraderId>, value: i32) -> Self {
        self.trader_requirements.push(TraderRequirement {
            trader_id: trader.into(),
            value,
        });
        self
    }

    pub fn requires(mut self, task: impl Into<TaskId>, status: &[RequirementStatus]) -> Self {
        self.task_requirements.push(TaskRequirement {
            task_id: task.into(),
            status: status.to_vec(),
        });
        self
    }

    pub fn fails_if(mut self, task: impl Into<TaskId>) -> Self {
        self.failed_requirements.push(FailedRequirement {
            task_id: task.into(),
        });
        self
    }

    pub fn with_alternative(mut self, task: impl Into<TaskId>) -> Self {
        self.alternatives.push(task.into());
        self
    }

    /// 阵营是否与任务相关（"Any" 对所有阵营相关）
    pub fn is_faction_relevant(&self, faction: &str) -> bool {
        self.faction_name == ANY_FACTION || self.faction_name == faction
    }
}
