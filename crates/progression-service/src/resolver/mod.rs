//! 可用性解析
//!
//! 读路径：按角色解析任务可接取 / 可解锁状态，以及藏身处模块可建造状态

mod availability;
mod cache;
mod hideout;
pub mod matching;

pub use availability::{ActorAvailability, AvailabilityResolver, ResolveMode};
pub use cache::AvailabilityCache;
pub use hideout::HideoutResolver;
pub use matching::{RequirementOutcome, requirement_holds, requirement_outcome};
