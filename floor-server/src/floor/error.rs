//! Floor engine errors

use shared::error::{AppError, ErrorCode};
use shared::models::TableStatus;
use thiserror::Error;

use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum FloorError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Table not found: {0}")]
    TableNotFound(i64),

    #[error("Combination not found: {0}")]
    CombinationNotFound(i64),

    #[error("Invalid transition for {entity} {id}: {from} -> {to}")]
    InvalidTransition {
        entity: &'static str,
        id: i64,
        from: TableStatus,
        to: TableStatus,
    },

    #[error("Table {table_id} is not free (status: {status})")]
    TableNotFree { table_id: i64, status: TableStatus },

    #[error("Table {0} is not combinable")]
    NotCombinable(i64),

    #[error("Table {table_id} already belongs to combination {combination_id}")]
    AlreadyCombined { table_id: i64, combination_id: i64 },

    #[error("A combination needs at least 2 tables, got {0}")]
    InsufficientTables(usize),

    #[error("Table {table_id} is part of active combination {combination_id}")]
    CombinationConflict { table_id: i64, combination_id: i64 },

    #[error(
        "Concurrent modification on {entity} {id}: expected version {expected}, found {actual}"
    )]
    ConcurrentModification {
        entity: &'static str,
        id: i64,
        expected: u64,
        actual: u64,
    },

    #[error("Validation failed: {0}")]
    Validation(String),
}

pub type FloorResult<T> = Result<T, FloorError>;

impl From<FloorError> for AppError {
    fn from(err: FloorError) -> Self {
        let message = err.to_string();
        match err {
            FloorError::Storage(e) => {
                tracing::error!(error = %e, "Floor storage error");
                AppError::database(message)
            }
            FloorError::TableNotFound(id) => {
                AppError::with_message(ErrorCode::TableNotFound, message).with_detail("table_id", id)
            }
            FloorError::CombinationNotFound(id) => {
                AppError::with_message(ErrorCode::CombinationNotFound, message)
                    .with_detail("combination_id", id)
            }
            FloorError::InvalidTransition {
                entity,
                id,
                from,
                to,
            } => AppError::with_message(ErrorCode::InvalidTransition, message)
                .with_detail("entity", entity)
                .with_detail("id", id)
                .with_detail("from", from.as_str())
                .with_detail("to", to.as_str()),
            FloorError::TableNotFree { table_id, status } => {
                AppError::with_message(ErrorCode::TableNotFree, message)
                    .with_detail("table_id", table_id)
                    .with_detail("status", status.as_str())
            }
            FloorError::NotCombinable(id) => {
                AppError::with_message(ErrorCode::TableNotCombinable, message)
                    .with_detail("table_id", id)
            }
            FloorError::AlreadyCombined {
                table_id,
                combination_id,
            } => AppError::with_message(ErrorCode::TableAlreadyCombined, message)
                .with_detail("table_id", table_id)
                .with_detail("combination_id", combination_id),
            FloorError::InsufficientTables(count) => {
                AppError::with_message(ErrorCode::InsufficientTables, message)
                    .with_detail("count", count)
            }
            FloorError::CombinationConflict {
                table_id,
                combination_id,
            } => AppError::with_message(ErrorCode::CombinationConflict, message)
                .with_detail("table_id", table_id)
                .with_detail("combination_id", combination_id),
            FloorError::ConcurrentModification {
                entity,
                id,
                expected,
                actual,
            } => AppError::conflict(message)
                .with_detail("entity", entity)
                .with_detail("id", id)
                .with_detail("expected_version", expected)
                .with_detail("actual_version", actual),
            FloorError::Validation(msg) => AppError::validation(msg),
        }
    }
}
