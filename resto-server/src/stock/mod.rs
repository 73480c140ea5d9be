//! Stock: ingredients and the append-only movement ledger
//!
//! An ingredient's `quantity` column caches `Σ IN − Σ OUT` of its
//! movements. It is rewritten in the same transaction as every movement
//! insert and is never set directly.

pub mod ledger;

pub use ledger::StockService;

use crate::db::repository::RepoError;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StockError {
    #[error("Ingredient {0} not found")]
    IngredientNotFound(i64),

    #[error("Ingredient name already exists: {0}")]
    NameExists(String),

    #[error("Insufficient stock for {name}: {available} {unit} available, {requested} requested")]
    InsufficientStock {
        ingredient_id: i64,
        name: String,
        unit: String,
        available: f64,
        requested: f64,
    },

    #[error("Movement quantity must be positive, got {0}")]
    InvalidQuantity(f64),

    #[error("Ingredient {0} has stock movements and cannot be deleted")]
    HasMovements(i64),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<sqlx::Error> for StockError {
    fn from(err: sqlx::Error) -> Self {
        StockError::Repo(err.into())
    }
}

impl From<AppError> for StockError {
    fn from(err: AppError) -> Self {
        StockError::Invalid(err.message)
    }
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        let message = err.to_string();
        match err {
            StockError::IngredientNotFound(id) => {
                AppError::with_message(ErrorCode::IngredientNotFound, message)
                    .with_detail("ingredient_id", id)
            }
            StockError::NameExists(name) => {
                AppError::with_message(ErrorCode::IngredientNameExists, message)
                    .with_detail("name", name)
            }
            StockError::InsufficientStock {
                ingredient_id,
                available,
                requested,
                ..
            } => AppError::with_message(ErrorCode::InsufficientStock, message)
                .with_detail("ingredient_id", ingredient_id)
                .with_detail("available", available)
                .with_detail("requested", requested),
            StockError::InvalidQuantity(_) => {
                AppError::with_message(ErrorCode::InvalidMovementQuantity, message)
            }
            StockError::HasMovements(id) => {
                AppError::with_message(ErrorCode::IngredientHasMovements, message)
                    .with_detail("ingredient_id", id)
            }
            StockError::Invalid(msg) => AppError::validation(msg),
            StockError::Repo(e) => e.into(),
        }
    }
}

pub type StockResult<T> = Result<T, StockError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_insufficient_stock_maps_to_400_with_details() {
        let err: AppError = StockError::InsufficientStock {
            ingredient_id: 7,
            name: "Farine".into(),
            unit: "kg".into(),
            available: 2.5,
            requested: 4.0,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(err.http_status(), StatusCode::BAD_REQUEST);
        assert!(err.message.contains("Farine"));
        let details = err.details.unwrap();
        assert_eq!(details["available"], 2.5);
    }

    #[test]
    fn test_has_movements_is_conflict() {
        let err: AppError = StockError::HasMovements(1).into();
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
    }
}
