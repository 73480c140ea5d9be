//! Menu Item Repository

use super::{RepoError, RepoResult};
use shared::models::{MenuItem, MenuItemCreate, MenuItemQuery, MenuItemUpdate};
use shared::util::snowflake_id;
use sqlx::{Executor, Sqlite, SqlitePool};

const COLUMNS: &str = "id, category_id, name, description, price, is_available";

pub async fn find_all(pool: &SqlitePool, query: &MenuItemQuery) -> RepoResult<Vec<MenuItem>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM menu_item \
         WHERE (?1 IS NULL OR category_id = ?1) AND (?2 IS NULL OR is_available = ?2) \
         ORDER BY name"
    );
    let items = sqlx::query_as::<_, MenuItem>(&sql)
        .bind(query.category_id)
        .bind(query.available)
        .fetch_all(pool)
        .await?;
    Ok(items)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<MenuItem>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COLUMNS} FROM menu_item WHERE id = ?");
    let item = sqlx::query_as::<_, MenuItem>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(item)
}

pub async fn create(pool: &SqlitePool, data: MenuItemCreate) -> RepoResult<MenuItem> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO menu_item (id, category_id, name, description, price, is_available) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.category_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.is_available.unwrap_or(true))
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu item".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: MenuItemUpdate) -> RepoResult<MenuItem> {
    let rows = sqlx::query(
        "UPDATE menu_item SET category_id = COALESCE(?1, category_id), name = COALESCE(?2, name), description = COALESCE(?3, description), price = COALESCE(?4, price), is_available = COALESCE(?5, is_available) WHERE id = ?6",
    )
    .bind(data.category_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.is_available)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu item {id} not found")))
}

/// Order lines referencing this item (any order status)
pub async fn count_order_lines(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM order_line WHERE menu_item_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM menu_item WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
