//! 服务层

pub mod dto;
mod progress_service;

pub use progress_service::ProgressService;
