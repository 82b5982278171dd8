//! Numeric error codes
//!
//! Screens switch on these, so a value never changes meaning once shipped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error code carried in every error envelope
///
/// Serialized as a bare `u16`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ---- 0xxx general ----
    Success = 0,
    ValidationFailed = 2,
    NotFound = 3,

    // ---- 70xx tables ----
    TableNotFound = 7001,
    /// Seating or combining a table that is not `libre`
    TableNotFree = 7002,
    InvalidTransition = 7003,
    TableNotCombinable = 7004,
    TableAlreadyCombined = 7005,
    InsufficientTables = 7006,
    /// Mutation on a combined table outside the combination engine
    CombinationConflict = 7007,

    // ---- 71xx combinations ----
    /// Unknown or already dissolved
    CombinationNotFound = 7101,

    // ---- 72xx concurrency ----
    ConcurrentModification = 7201,

    // ---- 9xxx system ----
    InternalError = 9001,
    DatabaseError = 9002,
    ConfigError = 9005,
}

impl ErrorCode {
    const ALL: [ErrorCode; 15] = [
        ErrorCode::Success,
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::TableNotFound,
        ErrorCode::TableNotFree,
        ErrorCode::InvalidTransition,
        ErrorCode::TableNotCombinable,
        ErrorCode::TableAlreadyCombined,
        ErrorCode::InsufficientTables,
        ErrorCode::CombinationConflict,
        ErrorCode::CombinationNotFound,
        ErrorCode::ConcurrentModification,
        ErrorCode::InternalError,
        ErrorCode::DatabaseError,
        ErrorCode::ConfigError,
    ];

    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default English message
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "OK",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableNotFree => "Table is not free",
            ErrorCode::InvalidTransition => "State transition not allowed",
            ErrorCode::TableNotCombinable => "Table cannot be combined",
            ErrorCode::TableAlreadyCombined => "Table is already combined",
            ErrorCode::InsufficientTables => "A combination needs at least two tables",
            ErrorCode::CombinationConflict => "Table is part of an active combination",
            ErrorCode::CombinationNotFound => "Combination not found",
            ErrorCode::ConcurrentModification => {
                "Resource was modified concurrently, reload and retry"
            }
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A `u16` that names no [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == value)
            .ok_or(InvalidErrorCode(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_codes() {
        assert_eq!(ErrorCode::TableNotFound.code(), 7001);
        assert_eq!(ErrorCode::TableNotFree.code(), 7002);
        assert_eq!(ErrorCode::InvalidTransition.code(), 7003);
        assert_eq!(ErrorCode::CombinationConflict.code(), 7007);
        assert_eq!(ErrorCode::CombinationNotFound.code(), 7101);
        assert_eq!(ErrorCode::ConcurrentModification.code(), 7201);
    }

    #[test]
    fn test_every_code_parses_back() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::InvalidTransition).unwrap();
        assert_eq!(json, "7003");
        let code: ErrorCode = serde_json::from_str("7201").unwrap();
        assert_eq!(code, ErrorCode::ConcurrentModification);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }
}
