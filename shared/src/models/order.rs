//! Order Model

use serde::{Deserialize, Serialize};

/// Order status
///
/// `PENDING → PREPARING → READY → PAID`, `CANCELLED` from any open state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Paid,
    Cancelled,
}

impl OrderStatus {
    /// PAID and CANCELLED accept no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Lines may only change before the kitchen marks the order ready
    pub fn accepts_line_changes(&self) -> bool {
        matches!(self, Self::Pending | Self::Preparing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Preparing => "PREPARING",
            Self::Ready => "READY",
            Self::Paid => "PAID",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderType {
    DineIn,
    Takeaway,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub table_id: Option<i64>,
    /// Waiter who opened the order (user id)
    pub server_id: i64,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub subtotal: f64,
    pub discount: f64,
    pub tax_amount: f64,
    pub total: f64,
    pub promotion_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Recalculated order totals (every component rounded to 2 decimals)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub discount: f64,
    pub tax_amount: f64,
    /// `subtotal - discount + tax_amount`
    pub total: f64,
}

/// Order line (owned by its order, unit price snapshotted at add-time)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub quantity: i32,
    pub unit_price: f64,
    pub notes: Option<String>,
}

/// Order with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Line payload (add a menu item to an order)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub menu_item_id: i64,
    pub quantity: i32,
    pub notes: Option<String>,
}

/// Update line payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderLineUpdate {
    pub quantity: Option<i32>,
    pub notes: Option<String>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub order_type: OrderType,
    pub table_id: Option<i64>,
    pub notes: Option<String>,
    #[serde(default)]
    pub lines: Vec<OrderLineInput>,
}

/// Update order payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub order_type: Option<OrderType>,
    pub table_id: Option<i64>,
    pub notes: Option<String>,
}

/// Status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Attach a promotion by code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPromotionInput {
    pub code: String,
}

/// List filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub table_id: Option<i64>,
}
