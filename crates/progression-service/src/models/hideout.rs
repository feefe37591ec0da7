//! 藏身处模块与玩家等级表

use serde::{Deserialize, Serialize};

use super::ids::{ModuleId, StationId};
use super::task::null_as_default;

/// 设施等级需求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationLevelRequirement {
    pub station_id: StationId,
    pub level: u32,
}

/// 藏身处模块（设施的某一等级）
///
/// 同一设施的上一级模块是隐式前置条件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HideoutModule {
    pub id: ModuleId,
    pub station_id: StationId,
    pub level: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub station_level_requirements: Vec<StationLevelRequirement>,
}

impl HideoutModule {
    pub fn new(id: impl Into<ModuleId>, station: impl Into<StationId>, level: u32) -> Self {
        Self {
            id: id.into(),
            station_id: station.into(),
            level,
            station_level_requirements: Vec::new(),
        }
    }

    pub fn requires_station(mut self, station: impl Into<StationId>, level: u32) -> Self {
        self.station_level_requirements.push(StationLevelRequirement {
            station_id: station.into(),
            level,
        });
        self
    }
}

/// 等级表的一行，`exp` 为达到该等级所需的累计经验
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLevel {
    pub level: u32,
    pub exp: u64,
}
