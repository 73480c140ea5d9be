//! User Model

use serde::{Deserialize, Serialize};

/// Staff role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Role {
    Manager,
    /// Kitchen staff
    Cuisinier,
    /// Waiter
    Serveur,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manager => "MANAGER",
            Self::Cuisinier => "CUISINIER",
            Self::Serveur => "SERVEUR",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MANAGER" => Some(Self::Manager),
            "CUISINIER" => Some(Self::Cuisinier),
            "SERVEUR" => Some(Self::Serveur),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User entity (password hash never leaves the server)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub hash_pass: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
    pub role: Role,
}

/// Update user payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}
