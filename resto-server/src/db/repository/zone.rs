//! Zone Repository

use super::{RepoError, RepoResult};
use shared::models::{Zone, ZoneCreate, ZoneUpdate};
use shared::util::snowflake_id;
use sqlx::SqlitePool;

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Zone>> {
    let zones = sqlx::query_as::<_, Zone>("SELECT id, name, description FROM zone ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(zones)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Zone>> {
    let zone = sqlx::query_as::<_, Zone>("SELECT id, name, description FROM zone WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(zone)
}

pub async fn create(pool: &SqlitePool, data: ZoneCreate) -> RepoResult<Zone> {
    let id = snowflake_id();
    sqlx::query("INSERT INTO zone (id, name, description) VALUES (?, ?, ?)")
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .execute(pool)
        .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create zone".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ZoneUpdate) -> RepoResult<Zone> {
    let rows = sqlx::query(
        "UPDATE zone SET name = COALESCE(?1, name), description = COALESCE(?2, description) WHERE id = ?3",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Zone {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Zone {id} not found")))
}

pub async fn count_tables(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM dining_table WHERE zone_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM zone WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
