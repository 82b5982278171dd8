//! HTTP status per error code

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// 409 means "re-read the floor and retry"; 422 means the request is
    /// well formed but the current status forbids it.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,
            Self::ValidationFailed => StatusCode::BAD_REQUEST,
            Self::NotFound | Self::TableNotFound | Self::CombinationNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::TableNotFree
            | Self::TableAlreadyCombined
            | Self::CombinationConflict
            | Self::ConcurrentModification => StatusCode::CONFLICT,
            Self::InvalidTransition | Self::TableNotCombinable | Self::InsufficientTables => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
