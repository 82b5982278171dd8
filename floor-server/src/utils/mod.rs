//! 工具模块 - 通用工具函数和类型
//!
//! - [`AppError`] / [`ApiResponse`] - re-exported from `shared::error`
//! - [`logger`] - tracing subscriber setup
//! - [`validation`] - text length limits

pub mod error;
pub mod logger;
pub mod validation;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use error::ok;
