//! Repository Module
//!
//! Free functions over SQLite, one file per table. Reads take any executor
//! (pool or open transaction); multi-statement writes take
//! `&mut SqliteConnection` so callers control the transaction.

pub mod category;
pub mod dining_table;
pub mod ingredient;
pub mod menu_item;
pub mod order;
pub mod order_line;
pub mod payment;
pub mod promotion;
pub mod report;
pub mod reservation;
pub mod settings;
pub mod stock_movement;
pub mod user;
pub mod zone;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                RepoError::Validation(format!("Referenced record does not exist: {}", db.message()))
            }
            sqlx::Error::Database(db) if db.is_check_violation() => {
                RepoError::Validation(db.message().to_string())
            }
            other => RepoError::Database(other.to_string()),
        }
    }
}

impl RepoError {
    /// Map a unique-constraint violation to a domain-specific code
    pub fn on_duplicate(self, code: ErrorCode) -> AppError {
        match self {
            RepoError::Duplicate(msg) => AppError::new(code).with_detail("constraint", msg),
            other => other.into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                AppError::database("Database operation failed")
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_error_to_app_error() {
        let err: AppError = RepoError::NotFound("Zone 3 not found".into()).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Zone 3 not found");

        let err: AppError = RepoError::Database("disk I/O error".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("disk"));
    }

    #[test]
    fn test_on_duplicate_only_rewrites_duplicates() {
        let err = RepoError::Duplicate("UNIQUE constraint failed: zone.name".into())
            .on_duplicate(ErrorCode::ZoneNameExists);
        assert_eq!(err.code, ErrorCode::ZoneNameExists);

        let err = RepoError::Validation("bad".into()).on_duplicate(ErrorCode::ZoneNameExists);
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
