//! Error codes and the response envelope
//!
//! | Range | Category |
//! |-------|----------|
//! | 0xxx | general (validation, not found) |
//! | 70xx | tables and their state machine |
//! | 71xx | combinations |
//! | 72xx | optimistic concurrency |
//! | 9xxx | system |
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::new(ErrorCode::TableNotFree).with_detail("table_id", 12);
//! let response = ApiResponse::<()>::error(&err);
//! assert_eq!(response.code, Some(7002));
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
