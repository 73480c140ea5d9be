//! Stock Movement Model

use serde::{Deserialize, Serialize};

/// Movement direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum MovementDirection {
    In,
    Out,
}

impl MovementDirection {
    /// +1 for IN, -1 for OUT
    pub fn sign(&self) -> i8 {
        match self {
            Self::In => 1,
            Self::Out => -1,
        }
    }
}

/// Stock movement (append-only ledger entry)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StockMovement {
    pub id: i64,
    pub ingredient_id: i64,
    pub direction: MovementDirection,
    pub quantity: f64,
    pub reason: Option<String>,
    pub created_at: i64,
}

/// Create movement payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovementCreate {
    pub ingredient_id: i64,
    pub direction: MovementDirection,
    pub quantity: f64,
    pub reason: Option<String>,
}

/// Signed ledger sum for one ingredient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerTotal {
    pub ingredient_id: i64,
    pub total: f64,
    pub movement_count: i64,
}
