//! AppError and the response envelope

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error returned by every floor handler
///
/// `details` carries machine-readable context such as `table_id`, the
/// rejected `from`/`to` statuses or the conflicting `combination_id`, so
/// screens can react without parsing `message`.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ---- shorthands ----

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// `{resource} not found`, with the resource echoed in details
    pub fn not_found(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{} not found", resource))
            .with_detail("resource", resource)
    }

    /// Stale optimistic version
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ConcurrentModification, msg)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }
}

/// Response envelope shared by success and failure
///
/// ```json
/// {"code": 0, "message": "OK", "data": {...}}
/// {"code": 7003, "message": "...", "details": {"from": "libre", "to": "limpieza"}}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 0 on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: Some(0),
            message: "OK".to_string(),
            data: Some(data),
            details: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn error(err: &AppError) -> Self {
        Self {
            code: Some(err.code.code()),
            message: err.message.clone(),
            data: None,
            details: err.details.clone(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.http_status();

        match self.code.category() {
            ErrorCategory::System => {
                tracing::error!(code = %self.code, message = %self.message, "System error")
            }
            ErrorCategory::Concurrency => {
                tracing::debug!(code = %self.code, message = %self.message, "Stale write rejected")
            }
            _ => {}
        }

        (status, axum::Json(ApiResponse::<()>::error(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message() {
        let err = AppError::new(ErrorCode::TableNotFound);
        assert_eq!(err.message, "Table not found");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_transition_details() {
        let err = AppError::new(ErrorCode::InvalidTransition)
            .with_detail("from", "libre")
            .with_detail("to", "limpieza");

        let details = err.details.unwrap();
        assert_eq!(details["from"], "libre");
        assert_eq!(details["to"], "limpieza");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::new(ErrorCode::TableNotFound).http_status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::conflict("stale").http_status(), StatusCode::CONFLICT);
        assert_eq!(AppError::validation("bad").http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::database("commit failed").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_names_resource() {
        let err = AppError::not_found("Timer for table 7");
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Timer for table 7 not found");
        assert_eq!(err.details.unwrap()["resource"], "Timer for table 7");
    }

    #[test]
    fn test_error_envelope() {
        let err = AppError::new(ErrorCode::TableNotFree).with_detail("table_id", 12);
        let response = ApiResponse::<()>::error(&err);

        assert_eq!(response.code, Some(7002));
        assert!(response.data.is_none());
        assert_eq!(response.details.unwrap()["table_id"], 12);
    }

    #[test]
    fn test_success_envelope_omits_details() {
        let json = serde_json::to_string(&ApiResponse::success("hello")).unwrap();
        assert!(json.contains("\"code\":0"));
        assert!(json.contains("\"data\":\"hello\""));
        assert!(!json.contains("details"));
    }
}
