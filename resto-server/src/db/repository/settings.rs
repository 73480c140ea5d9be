//! Restaurant Settings Repository (singleton row, id = 1)

use super::{RepoError, RepoResult};
use shared::models::{RestaurantSettings, RestaurantSettingsUpdate};
use shared::util::now_millis;
use sqlx::{Executor, Sqlite, SqlitePool};

pub async fn get<'e, E>(executor: E) -> RepoResult<Option<RestaurantSettings>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let settings = sqlx::query_as::<_, RestaurantSettings>(
        "SELECT name, tax_rate, currency, updated_at FROM restaurant_settings WHERE id = 1",
    )
    .fetch_optional(executor)
    .await?;
    Ok(settings)
}

/// Insert the row if missing; returns true when it was created
pub async fn insert_default(pool: &SqlitePool, tax_rate: f64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "INSERT OR IGNORE INTO restaurant_settings (id, name, tax_rate, currency, updated_at) VALUES (1, 'Restaurant', ?, 'XAF', ?)",
    )
    .bind(tax_rate)
    .bind(now_millis())
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn update(
    pool: &SqlitePool,
    data: RestaurantSettingsUpdate,
) -> RepoResult<RestaurantSettings> {
    let rows = sqlx::query(
        "UPDATE restaurant_settings SET name = COALESCE(?1, name), tax_rate = COALESCE(?2, tax_rate), currency = COALESCE(?3, currency), updated_at = ?4 WHERE id = 1",
    )
    .bind(&data.name)
    .bind(data.tax_rate)
    .bind(&data.currency)
    .bind(now_millis())
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("Restaurant settings not initialized".into()));
    }
    get(pool)
        .await?
        .ok_or_else(|| RepoError::NotFound("Restaurant settings not initialized".into()))
}
