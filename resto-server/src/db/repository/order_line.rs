//! Order Line Repository

use super::RepoResult;
use shared::models::OrderLine;
use sqlx::{Executor, Sqlite, SqliteConnection};

const COLUMNS: &str = "id, order_id, menu_item_id, quantity, unit_price, notes";

pub async fn find_by_order<'e, E>(executor: E, order_id: i64) -> RepoResult<Vec<OrderLine>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COLUMNS} FROM order_line WHERE order_id = ? ORDER BY id");
    let lines = sqlx::query_as::<_, OrderLine>(&sql)
        .bind(order_id)
        .fetch_all(executor)
        .await?;
    Ok(lines)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<OrderLine>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COLUMNS} FROM order_line WHERE id = ?");
    let line = sqlx::query_as::<_, OrderLine>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(line)
}

pub async fn insert(conn: &mut SqliteConnection, line: &OrderLine) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO order_line (id, order_id, menu_item_id, quantity, unit_price, notes) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(line.id)
    .bind(line.order_id)
    .bind(line.menu_item_id)
    .bind(line.quantity)
    .bind(line.unit_price)
    .bind(&line.notes)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn update(
    conn: &mut SqliteConnection,
    id: i64,
    quantity: i32,
    notes: Option<&str>,
) -> RepoResult<()> {
    sqlx::query("UPDATE order_line SET quantity = ?, notes = ? WHERE id = ?")
        .bind(quantity)
        .bind(notes)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM order_line WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}
