//! Stock Movement Repository (append-only)

use super::RepoResult;
use shared::models::{MovementDirection, StockMovement};
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, ingredient_id, direction, quantity, reason, created_at";

pub async fn find_by_ingredient(
    pool: &SqlitePool,
    ingredient_id: i64,
) -> RepoResult<Vec<StockMovement>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM stock_movement WHERE ingredient_id = ? ORDER BY created_at DESC, id DESC"
    );
    let movements = sqlx::query_as::<_, StockMovement>(&sql)
        .bind(ingredient_id)
        .fetch_all(pool)
        .await?;
    Ok(movements)
}

/// Direction and quantity of every movement, for exact summation
pub async fn amounts<'e, E>(
    executor: E,
    ingredient_id: i64,
) -> RepoResult<Vec<(MovementDirection, f64)>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, (MovementDirection, f64)>(
        "SELECT direction, quantity FROM stock_movement WHERE ingredient_id = ?",
    )
    .bind(ingredient_id)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

pub async fn count_by_ingredient(pool: &SqlitePool, ingredient_id: i64) -> RepoResult<i64> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stock_movement WHERE ingredient_id = ?")
            .bind(ingredient_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

pub async fn insert(conn: &mut SqliteConnection, movement: &StockMovement) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO stock_movement (id, ingredient_id, direction, quantity, reason, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(movement.id)
    .bind(movement.ingredient_id)
    .bind(movement.direction)
    .bind(movement.quantity)
    .bind(&movement.reason)
    .bind(movement.created_at)
    .execute(conn)
    .await?;
    Ok(())
}
