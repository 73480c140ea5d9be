//! Zone Model

use serde::{Deserialize, Serialize};

/// Zone entity (dining room, terrace, private room...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Zone {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Create zone payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneCreate {
    pub name: String,
    pub description: Option<String>,
}

/// Update zone payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}
