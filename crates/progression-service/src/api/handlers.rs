//! 进度 API 处理器

use axum::{
    Json,
    extract::{Path, State},
};

use super::response::ApiResponse;
use super::state::AppState;
use crate::aggregate::TeamAvailability;
use crate::error::ProgressError;
use crate::models::{ActorId, ModuleId, TaskId};
use crate::service::dto::{
    AvailabilityResponse, BatchUpdateResponse, InvalidationResponse, ProgressResponse,
    TaskUpdateItem, TeamAvailabilityRequest, UpdateModuleRequest, UpdateModuleResponse,
    UpdateTaskRequest, UpdateTaskResponse,
};

type ApiResult<T> = Result<Json<ApiResponse<T>>, ProgressError>;

/// GET /api/v1/progress/{actor_id}
pub async fn get_progress(
    State(state): State<AppState>,
    Path(actor_id): Path<ActorId>,
) -> ApiResult<ProgressResponse> {
    let progress = state.service.get_progress(&actor_id).await?;
    Ok(Json(ApiResponse::success(progress)))
}

/// PUT /api/v1/progress/{actor_id}/tasks/{task_id}
pub async fn update_task(
    State(state): State<AppState>,
    Path((actor_id, task_id)): Path<(ActorId, TaskId)>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<UpdateTaskResponse> {
    let response = state
        .service
        .update_task(&actor_id, &task_id, req.state)
        .await?;
    Ok(Json(ApiResponse::success(response)))
}

/// PUT /api/v1/progress/{actor_id}/tasks
pub async fn update_tasks(
    State(state): State<AppState>,
    Path(actor_id): Path<ActorId>,
    Json(items): Json<Vec<TaskUpdateItem>>,
) -> ApiResult<BatchUpdateResponse> {
    let response = state.service.update_tasks(&actor_id, items).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// PUT /api/v1/progress/{actor_id}/hideout/{module_id}
pub async fn update_module(
    State(state): State<AppState>,
    Path((actor_id, module_id)): Path<(ActorId, ModuleId)>,
    Json(req): Json<UpdateModuleRequest>,
) -> ApiResult<UpdateModuleResponse> {
    let response = state
        .service
        .update_module(&actor_id, &module_id, req.complete)
        .await?;
    Ok(Json(ApiResponse::success(response)))
}

/// GET /api/v1/progress/{actor_id}/availability
pub async fn actor_availability(
    State(state): State<AppState>,
    Path(actor_id): Path<ActorId>,
) -> ApiResult<AvailabilityResponse> {
    let response = state.service.actor_availability(&actor_id).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// POST /api/v1/team/availability
pub async fn team_availability(
    State(state): State<AppState>,
    Json(req): Json<TeamAvailabilityRequest>,
) -> ApiResult<TeamAvailability> {
    let response = state.service.team_availability(req).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// GET /api/v1/progress/{actor_id}/invalidations
pub async fn invalidations(
    State(state): State<AppState>,
    Path(actor_id): Path<ActorId>,
) -> ApiResult<InvalidationResponse> {
    let response = state.service.invalidations(&actor_id).await?;
    Ok(Json(ApiResponse::success(response)))
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}
