//! 应用状态定义

use std::sync::Arc;

use crate::service::ProgressService;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ProgressService>,
}

impl AppState {
    pub fn new(service: Arc<ProgressService>) -> Self {
        Self { service }
    }
}
