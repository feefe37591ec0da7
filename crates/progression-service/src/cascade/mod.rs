//! 级联更新
//!
//! 写路径：任务状态变更的连锁传播，以及藏身处模块的等级联动

mod dto;
mod engine;
mod hideout;

pub use dto::{CascadeOutcome, ChangeBatch, ModuleOutcome, TaskStateChange};
pub use engine::{CascadeEngine, cascade, cascade_many};
pub use hideout::set_module_state;
