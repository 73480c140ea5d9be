//! Category Repository

use super::{RepoError, RepoResult};
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use shared::util::snowflake_id;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, description, sort_order";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Category>> {
    let sql = format!("SELECT {COLUMNS} FROM category ORDER BY sort_order, name");
    let categories = sqlx::query_as::<_, Category>(&sql).fetch_all(pool).await?;
    Ok(categories)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let sql = format!("SELECT {COLUMNS} FROM category WHERE id = ?");
    let category = sqlx::query_as::<_, Category>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(category)
}

pub async fn create(pool: &SqlitePool, data: CategoryCreate) -> RepoResult<Category> {
    let id = snowflake_id();
    sqlx::query("INSERT INTO category (id, name, description, sort_order) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.sort_order.unwrap_or(0))
        .execute(pool)
        .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
    let rows = sqlx::query(
        "UPDATE category SET name = COALESCE(?1, name), description = COALESCE(?2, description), sort_order = COALESCE(?3, sort_order) WHERE id = ?4",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.sort_order)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Category {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
}

pub async fn count_items(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM menu_item WHERE category_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM category WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
