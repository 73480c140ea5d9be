//! Menu Item Model

use serde::{Deserialize, Serialize};

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_available: bool,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_available: Option<bool>,
}

/// Update menu item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub is_available: Option<bool>,
}

/// List filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemQuery {
    pub category_id: Option<i64>,
    pub available: Option<bool>,
}
