//! Error categories by code range

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Range an [`ErrorCode`] falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// 0xxx
    General,
    /// 70xx
    Table,
    /// 71xx
    Combination,
    /// 72xx, stale optimistic versions
    Concurrency,
    /// 9xxx
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            7000..7100 => Self::Table,
            7100..7200 => Self::Combination,
            7200..7300 => Self::Concurrency,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
