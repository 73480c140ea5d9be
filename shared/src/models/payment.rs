//! Payment Model

use serde::{Deserialize, Serialize};

/// Payment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentMethod {
    Cash,
    Card,
    MobileMoney,
    Other,
}

/// Payment entity (at most one per order)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub amount: f64,
    pub method: PaymentMethod,
    pub reference: String,
    pub paid_at: i64,
}

/// Create payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreate {
    pub order_id: i64,
    pub amount: f64,
    pub method: PaymentMethod,
    pub reference: Option<String>,
}

/// Settle an order for exactly its current total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSettle {
    pub order_id: i64,
    pub method: PaymentMethod,
    pub reference: Option<String>,
}
