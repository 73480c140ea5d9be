//! Report Models

use serde::{Deserialize, Serialize};

/// Date range filter (`YYYY-MM-DD`, inclusive)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<i64>,
}

/// Revenue for one payment method
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MethodTotal {
    pub method: String,
    pub count: i64,
    pub amount: f64,
}

/// Sales summary over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesReport {
    pub from: String,
    pub to: String,
    pub orders_paid: i64,
    pub revenue: f64,
    pub average_ticket: f64,
    pub tax_collected: f64,
    pub discounts: f64,
    pub by_method: Vec<MethodTotal>,
}

/// Best sellers by quantity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TopItem {
    pub menu_item_id: i64,
    pub name: String,
    pub quantity: i64,
    pub revenue: f64,
}

/// Order count per status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}
