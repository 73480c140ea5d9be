//! Notification bus message types
//!
//! Published in-process by resto-server and forwarded as-is to any
//! listener (cashier display, kitchen screen).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{OrderStatus, StockStatus};

/// Notification level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Resource change signal (after CRUD writes)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncPayload {
    /// Resource type (e.g. "order", "menu_item", "dining_table")
    pub resource: String,
    /// Monotonic per-resource version
    pub version: u64,
    /// "created", "updated" or "deleted"
    pub action: String,
    pub id: String,
    /// Entity snapshot, absent on delete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Everything the server tells its subscribers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    /// Order totals were recalculated
    OrderTotalsUpdated {
        order_id: i64,
        subtotal: f64,
        discount: f64,
        tax_amount: f64,
        total: f64,
    },
    OrderStatusChanged {
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
    },
    /// Ingredient at or below its alert threshold
    LowStock {
        ingredient_id: i64,
        name: String,
        quantity: f64,
        alert_threshold: f64,
        status: StockStatus,
    },
    ResourceChanged(SyncPayload),
}

impl Notification {
    pub fn level(&self) -> NotificationLevel {
        match self {
            Self::LowStock {
                status: StockStatus::Rupture,
                ..
            } => NotificationLevel::Critical,
            Self::LowStock { .. } => NotificationLevel::Warning,
            _ => NotificationLevel::Info,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::OrderTotalsUpdated { .. } => "order_totals_updated",
            Self::OrderStatusChanged { .. } => "order_status_changed",
            Self::LowStock { .. } => "low_stock",
            Self::ResourceChanged(_) => "resource_changed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_levels() {
        let rupture = Notification::LowStock {
            ingredient_id: 1,
            name: "Tomate".into(),
            quantity: 0.0,
            alert_threshold: 2.0,
            status: StockStatus::Rupture,
        };
        assert_eq!(rupture.level(), NotificationLevel::Critical);

        let low = Notification::LowStock {
            ingredient_id: 1,
            name: "Tomate".into(),
            quantity: 1.0,
            alert_threshold: 2.0,
            status: StockStatus::Faible,
        };
        assert_eq!(low.level(), NotificationLevel::Warning);
    }

    #[test]
    fn test_tagged_serialization() {
        let n = Notification::OrderStatusChanged {
            order_id: 5,
            from: OrderStatus::Pending,
            to: OrderStatus::Preparing,
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "order_status_changed");
        assert_eq!(json["to"], "PREPARING");
        assert_eq!(n.kind(), "order_status_changed");
    }
}
