//! 标识符类型
//!
//! 任务、角色、商人、藏身处模块各自使用独立的新类型，避免不同映射之间的键混用

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// 任务 ID
    TaskId
);
string_id!(
    /// 角色 ID（玩家本人或队友）
    ActorId
);
string_id!(
    /// 商人 ID
    TraderId
);
string_id!(
    /// 藏身处模块 ID（某个设施的某一等级）
    ModuleId
);
string_id!(
    /// 藏身处设施 ID
    StationId
);
