//! Startup seeding

use shared::models::Role;
use sqlx::SqlitePool;

use crate::auth::password::hash_password;
use crate::core::{Config, Result, ServerError};
use crate::db::repository::{settings, user};

/// Create the settings row with the configured tax rate when missing
pub async fn ensure_settings(pool: &SqlitePool, default_tax_rate: f64) -> Result<()> {
    let created = settings::insert_default(pool, default_tax_rate)
        .await
        .map_err(|e| ServerError::Database(e.to_string()))?;
    if created {
        tracing::info!(tax_rate = default_tax_rate, "Restaurant settings initialized");
    }
    Ok(())
}

/// Create the first MANAGER account on an empty user table
///
/// Needs `ADMIN_PASSWORD`; without it the server starts with no account and
/// logs a warning.
pub async fn ensure_admin(pool: &SqlitePool, config: &Config) -> Result<()> {
    let count = user::count(pool)
        .await
        .map_err(|e| ServerError::Database(e.to_string()))?;
    if count > 0 {
        return Ok(());
    }

    let Some(password) = config.admin_password.as_deref() else {
        tracing::warn!("No user exists and ADMIN_PASSWORD is not set; nobody can log in");
        return Ok(());
    };

    let hash_pass = hash_password(password)
        .map_err(|e| ServerError::Config(format!("Failed to hash admin password: {e}")))?;
    let admin = user::create(
        pool,
        user::NewUser {
            username: config.admin_username.clone(),
            display_name: "Administrator".to_string(),
            hash_pass,
            role: Role::Manager,
        },
    )
    .await
    .map_err(|e| ServerError::Database(e.to_string()))?;

    crate::security_log!(
        "INFO",
        "bootstrap_admin",
        user_id = admin.id,
        username = admin.username.as_str()
    );
    Ok(())
}
