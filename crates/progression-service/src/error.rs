//! 进度服务错误类型

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::models::{ModuleId, TaskId};

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("任务不存在: {0}")]
    TaskNotFound(TaskId),

    #[error("藏身处模块不存在: {0}")]
    ModuleNotFound(ModuleId),

    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("元数据加载失败: {0}")]
    Metadata(String),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON 序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ProgressError>;

impl ProgressError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Metadata(_))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TaskNotFound(_) => "TASK_NOT_FOUND",
            Self::ModuleNotFound(_) => "MODULE_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Metadata(_) => "METADATA_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::TaskNotFound(_) | Self::ModuleNotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Metadata(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) | Self::Serialization(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<progress_shared::error::SharedError> for ProgressError {
    fn from(err: progress_shared::error::SharedError) -> Self {
        use progress_shared::error::SharedError;
        match err {
            SharedError::Database(e) => Self::Database(e),
            SharedError::Serialization(e) => Self::Serialization(e),
            SharedError::Validation(msg) => Self::Validation(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ProgressError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, "数据库操作失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Serialization(e) => {
                tracing::error!(error = %e, "序列化失败");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::Metadata(e) => {
                tracing::error!(error = %e, "元数据不可用");
                "任务元数据暂不可用，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}
