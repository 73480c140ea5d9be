//! Ingredient Repository
//!
//! `quantity` is written only by the stock ledger.

use super::{RepoError, RepoResult};
use shared::models::{Ingredient, IngredientUpdate};
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, name, quantity, unit, alert_threshold, created_at, updated_at";

pub async fn find_all<'e, E>(executor: E) -> RepoResult<Vec<Ingredient>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COLUMNS} FROM ingredient ORDER BY name");
    let ingredients = sqlx::query_as::<_, Ingredient>(&sql)
        .fetch_all(executor)
        .await?;
    Ok(ingredients)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Ingredient>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COLUMNS} FROM ingredient WHERE id = ?");
    let ingredient = sqlx::query_as::<_, Ingredient>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(ingredient)
}

/// Ingredients at or below their alert threshold
pub async fn find_low_stock(pool: &SqlitePool) -> RepoResult<Vec<Ingredient>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM ingredient WHERE quantity <= alert_threshold OR quantity <= 0 ORDER BY quantity"
    );
    let ingredients = sqlx::query_as::<_, Ingredient>(&sql).fetch_all(pool).await?;
    Ok(ingredients)
}

/// Insert with a zero balance; stock arrives through movements
pub async fn insert(conn: &mut SqliteConnection, ingredient: &Ingredient) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO ingredient (id, name, quantity, unit, alert_threshold, created_at, updated_at) VALUES (?, ?, 0, ?, ?, ?, ?)",
    )
    .bind(ingredient.id)
    .bind(&ingredient.name)
    .bind(&ingredient.unit)
    .bind(ingredient.alert_threshold)
    .bind(ingredient.created_at)
    .bind(ingredient.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: IngredientUpdate,
    now: i64,
) -> RepoResult<Ingredient> {
    let rows = sqlx::query(
        "UPDATE ingredient SET name = COALESCE(?1, name), unit = COALESCE(?2, unit), alert_threshold = COALESCE(?3, alert_threshold), updated_at = ?4 WHERE id = ?5",
    )
    .bind(&data.name)
    .bind(&data.unit)
    .bind(data.alert_threshold)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Ingredient {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Ingredient {id} not found")))
}

/// Write the cached balance (ledger use only)
pub async fn set_quantity(
    conn: &mut SqliteConnection,
    id: i64,
    quantity: f64,
    now: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE ingredient SET quantity = ?, updated_at = ? WHERE id = ?")
        .bind(quantity)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM ingredient WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
