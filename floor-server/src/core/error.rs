use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::floor::FloorError;
use crate::storage::StorageError;
use crate::utils::{AppError, ErrorCode};

/// Startup and lifecycle errors
///
/// Request handlers return [`AppError`]; this type covers everything around
/// them (config, storage open, binding the listener).
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),

    #[error("引擎错误: {0}")]
    Floor(#[from] FloorError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

impl From<ServerError> for AppError {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Floor(err) => AppError::from(err),
            ServerError::Config(msg) => AppError::with_message(ErrorCode::ConfigError, msg),
            ServerError::Storage(err) => {
                tracing::error!(error = %err, "Storage error");
                AppError::database("A storage error occurred")
            }
            ServerError::Io(err) => {
                tracing::error!(error = %err, "IO error");
                AppError::internal("An IO error occurred")
            }
            ServerError::Internal(err) => {
                // 记录内部错误但不暴露详细信息
                tracing::error!(error = ?err, "Internal server error");
                AppError::internal("An internal error occurred")
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

/// 服务器 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
