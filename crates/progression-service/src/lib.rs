//! 任务 / 藏身处进度服务
//!
//! 跟踪每个角色在任务依赖图中的进度，回答"哪些任务当前可以接取"，
//! 并在任务状态变化时把连锁影响一次性写回。
//!
//! ## 模块结构
//!
//! - `models`: 任务、藏身处模块、进度快照等领域模型
//! - `graph`: 从元数据构建的不可变进度图
//! - `gates`: 等级 / 阵营 / 声望 / 商人解锁门槛
//! - `resolver`: 可用性解析（读路径），含共享的前置需求匹配规则
//! - `aggregate`: 玩家与队友的聚合视图
//! - `cascade`: 级联更新引擎（写路径）
//! - `invalidation`: 进度一致性检查
//! - `repository`: 进度存储
//! - `metadata`: 元数据来源与进度图缓存
//! - `service`: 服务编排
//! - `api`: REST 接口

pub mod aggregate;
pub mod api;
pub mod cascade;
pub mod error;
pub mod gates;
pub mod graph;
pub mod invalidation;
pub mod metadata;
pub mod models;
pub mod repository;
pub mod resolver;
pub mod service;

pub use aggregate::{MultiActorAggregator, TeamAvailability, TeamMember};
pub use cascade::{CascadeEngine, CascadeOutcome, ChangeBatch, TaskStateChange, cascade};
pub use error::{ProgressError, Result};
pub use graph::ProgressionGraph;
pub use resolver::{ActorAvailability, AvailabilityResolver};
pub use service::ProgressService;
