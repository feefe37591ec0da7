//! 领域模型

pub mod hideout;
pub mod ids;
pub mod progress;
pub mod task;

pub use hideout::{HideoutModule, PlayerLevel, StationLevelRequirement};
pub use ids::{ActorId, ModuleId, StationId, TaskId, TraderId};
pub use progress::{
    ActorView, Completion, ModuleChange, ModuleCompletion, ProgressSnapshot, TaskChange,
    TaskState, UpdateRecord, state_of,
};
pub use task::{
    ANY_FACTION, FailedRequirement, RequirementStatus, Task, TaskRequirement, TraderRef,
    TraderRequirement,
};
