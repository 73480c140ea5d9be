//! Order Repository

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderQuery, OrderStatus, OrderTotals, OrderType};
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, table_id, server_id, order_type, status, subtotal, discount, tax_amount, total, promotion_id, notes, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool, query: &OrderQuery) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM orders \
         WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR table_id = ?2) \
         ORDER BY created_at DESC"
    );
    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(query.status)
        .bind(query.table_id)
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Order>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COLUMNS} FROM orders WHERE id = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(order)
}

pub async fn insert(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, table_id, server_id, order_type, status, subtotal, discount, tax_amount, total, promotion_id, notes, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(order.id)
    .bind(order.table_id)
    .bind(order.server_id)
    .bind(order.order_type)
    .bind(order.status)
    .bind(order.subtotal)
    .bind(order.discount)
    .bind(order.tax_amount)
    .bind(order.total)
    .bind(order.promotion_id)
    .bind(&order.notes)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

/// Header fields editable through `PUT /orders/{id}`
pub async fn update_header(
    conn: &mut SqliteConnection,
    id: i64,
    order_type: OrderType,
    table_id: Option<i64>,
    notes: Option<&str>,
    now: i64,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE orders SET order_type = ?, table_id = ?, notes = ?, updated_at = ? WHERE id = ?",
    )
    .bind(order_type)
    .bind(table_id)
    .bind(notes)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}

pub async fn update_totals(
    conn: &mut SqliteConnection,
    id: i64,
    totals: &OrderTotals,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE orders SET subtotal = ?, discount = ?, tax_amount = ?, total = ?, updated_at = ? WHERE id = ?",
    )
    .bind(totals.subtotal)
    .bind(totals.discount)
    .bind(totals.tax_amount)
    .bind(totals.total)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn update_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: OrderStatus,
    now: i64,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}

pub async fn set_promotion(
    conn: &mut SqliteConnection,
    id: i64,
    promotion_id: Option<i64>,
) -> RepoResult<()> {
    sqlx::query("UPDATE orders SET promotion_id = ? WHERE id = ?")
        .bind(promotion_id)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Open (not PAID, not CANCELLED) orders on a table, excluding one order
pub async fn count_open_on_table(
    conn: &mut SqliteConnection,
    table_id: i64,
    exclude_order_id: i64,
) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM orders WHERE table_id = ? AND id != ? AND status NOT IN ('PAID', 'CANCELLED')",
    )
    .bind(table_id)
    .bind(exclude_order_id)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

/// Delete an order; lines cascade
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM orders WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}
