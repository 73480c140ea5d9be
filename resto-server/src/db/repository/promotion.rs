//! Promotion Repository

use super::{RepoError, RepoResult};
use shared::models::{Promotion, PromotionCreate, PromotionUpdate};
use shared::util::snowflake_id;
use sqlx::{Executor, Sqlite, SqlitePool};

const COLUMNS: &str = "id, code, description, kind, value, starts_at, ends_at, is_active";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Promotion>> {
    let sql = format!("SELECT {COLUMNS} FROM promotion ORDER BY starts_at DESC");
    let promotions = sqlx::query_as::<_, Promotion>(&sql).fetch_all(pool).await?;
    Ok(promotions)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Promotion>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COLUMNS} FROM promotion WHERE id = ?");
    let promotion = sqlx::query_as::<_, Promotion>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(promotion)
}

pub async fn find_by_code<'e, E>(executor: E, code: &str) -> RepoResult<Option<Promotion>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COLUMNS} FROM promotion WHERE code = ? LIMIT 1");
    let promotion = sqlx::query_as::<_, Promotion>(&sql)
        .bind(code)
        .fetch_optional(executor)
        .await?;
    Ok(promotion)
}

pub async fn create(pool: &SqlitePool, data: PromotionCreate) -> RepoResult<Promotion> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO promotion (id, code, description, kind, value, starts_at, ends_at, is_active) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&data.code)
    .bind(&data.description)
    .bind(data.kind)
    .bind(data.value)
    .bind(data.starts_at)
    .bind(data.ends_at)
    .bind(data.is_active.unwrap_or(true))
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create promotion".into()))
}

/// Full replacement of the editable fields (caller merges the update)
pub async fn save(pool: &SqlitePool, promotion: &Promotion) -> RepoResult<Promotion> {
    let rows = sqlx::query(
        "UPDATE promotion SET code = ?, description = ?, kind = ?, value = ?, starts_at = ?, ends_at = ?, is_active = ? WHERE id = ?",
    )
    .bind(&promotion.code)
    .bind(&promotion.description)
    .bind(promotion.kind)
    .bind(promotion.value)
    .bind(promotion.starts_at)
    .bind(promotion.ends_at)
    .bind(promotion.is_active)
    .bind(promotion.id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Promotion {} not found", promotion.id)));
    }
    find_by_id(pool, promotion.id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Promotion {} not found", promotion.id)))
}

/// Merge an update payload into an existing promotion
pub fn merge(mut promotion: Promotion, data: PromotionUpdate) -> Promotion {
    if let Some(code) = data.code {
        promotion.code = code;
    }
    if data.description.is_some() {
        promotion.description = data.description;
    }
    if let Some(kind) = data.kind {
        promotion.kind = kind;
    }
    if let Some(value) = data.value {
        promotion.value = value;
    }
    if let Some(starts_at) = data.starts_at {
        promotion.starts_at = starts_at;
    }
    if let Some(ends_at) = data.ends_at {
        promotion.ends_at = ends_at;
    }
    if let Some(is_active) = data.is_active {
        promotion.is_active = is_active;
    }
    promotion
}

pub async fn count_orders(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE promotion_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM promotion WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
