//! Restaurant Settings Model

use serde::{Deserialize, Serialize};

/// Restaurant settings (singleton row)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RestaurantSettings {
    pub name: String,
    /// Applied to `subtotal - discount`, e.g. 0.1925
    pub tax_rate: f64,
    pub currency: String,
    pub updated_at: i64,
}

/// Update settings payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestaurantSettingsUpdate {
    pub name: Option<String>,
    pub tax_rate: Option<f64>,
    pub currency: Option<String>,
}
