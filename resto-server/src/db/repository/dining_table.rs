//! Dining Table Repository

use super::{RepoError, RepoResult};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, TableStatus};
use shared::util::snowflake_id;
use sqlx::{Executor, Sqlite, SqlitePool};

const COLUMNS: &str = "id, name, zone_id, capacity, status";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DiningTable>> {
    let sql = format!("SELECT {COLUMNS} FROM dining_table ORDER BY name");
    let tables = sqlx::query_as::<_, DiningTable>(&sql).fetch_all(pool).await?;
    Ok(tables)
}

pub async fn find_by_zone(pool: &SqlitePool, zone_id: i64) -> RepoResult<Vec<DiningTable>> {
    let sql = format!("SELECT {COLUMNS} FROM dining_table WHERE zone_id = ? ORDER BY name");
    let tables = sqlx::query_as::<_, DiningTable>(&sql)
        .bind(zone_id)
        .fetch_all(pool)
        .await?;
    Ok(tables)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<DiningTable>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COLUMNS} FROM dining_table WHERE id = ?");
    let table = sqlx::query_as::<_, DiningTable>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(table)
}

pub async fn create(pool: &SqlitePool, data: DiningTableCreate) -> RepoResult<DiningTable> {
    let id = snowflake_id();
    sqlx::query("INSERT INTO dining_table (id, name, zone_id, capacity) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(&data.name)
        .bind(data.zone_id)
        .bind(data.capacity.unwrap_or(4))
        .execute(pool)
        .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create table".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: DiningTableUpdate) -> RepoResult<DiningTable> {
    let rows = sqlx::query(
        "UPDATE dining_table SET name = COALESCE(?1, name), zone_id = COALESCE(?2, zone_id), capacity = COALESCE(?3, capacity) WHERE id = ?4",
    )
    .bind(&data.name)
    .bind(data.zone_id)
    .bind(data.capacity)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Table {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Table {id} not found")))
}

pub async fn update_status<'e, E>(executor: E, id: i64, status: TableStatus) -> RepoResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query("UPDATE dining_table SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(executor)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Table {id} not found")));
    }
    Ok(())
}

/// Orders ever opened on this table
pub async fn count_orders(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE table_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Reservations ever made for this table
pub async fn count_reservations(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reservation WHERE table_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM dining_table WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
