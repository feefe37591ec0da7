//! HTTP 接口
//!
//! 进度写入与可用性查询的 REST 路由

pub mod handlers;
pub mod response;
pub mod state;

use axum::{
    Router,
    routing::{get, post, put},
};

pub use response::ApiResponse;
pub use state::AppState;

/// 进度相关路由
fn progress_routes() -> Router<AppState> {
    Router::new()
        .route("/progress/{actor_id}", get(handlers::get_progress))
        .route("/progress/{actor_id}/tasks", put(handlers::update_tasks))
        .route(
            "/progress/{actor_id}/tasks/{task_id}",
            put(handlers::update_task),
        )
        .route(
            "/progress/{actor_id}/hideout/{module_id}",
            put(handlers::update_module),
        )
        .route(
            "/progress/{actor_id}/availability",
            get(handlers::actor_availability),
        )
        .route(
            "/progress/{actor_id}/invalidations",
            get(handlers::invalidations),
        )
        .route("/team/availability", post(handlers::team_availability))
}

/// 构建完整路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", progress_routes())
        .with_state(state)
}
