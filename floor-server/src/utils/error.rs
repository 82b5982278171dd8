//! 统一错误处理
//!
//! Handlers return [`AppResult`]; engine errors convert into [`AppError`]
//! through `From<FloorError>`, which picks the error code and HTTP status.
//!
//! ```ignore
//! pub async fn get_by_id(...) -> AppResult<Json<ApiResponse<DiningTable>>> {
//!     let table = state.engine.get_table(id)?;
//!     Ok(ok(table))
//! }
//! ```

use axum::Json;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

/// Wrap data in a success envelope
pub fn ok<T>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}
