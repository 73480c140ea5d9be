//! Payment Repository
//!
//! `order_id` is UNIQUE: a second payment for the same order fails at the
//! index even when two requests race past the existence check.

use super::RepoResult;
use shared::models::Payment;
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, order_id, amount, method, reference, paid_at";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Payment>> {
    let sql = format!("SELECT {COLUMNS} FROM payment ORDER BY paid_at DESC");
    let payments = sqlx::query_as::<_, Payment>(&sql).fetch_all(pool).await?;
    Ok(payments)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Payment>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COLUMNS} FROM payment WHERE id = ?");
    let payment = sqlx::query_as::<_, Payment>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(payment)
}

pub async fn find_by_order<'e, E>(executor: E, order_id: i64) -> RepoResult<Option<Payment>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COLUMNS} FROM payment WHERE order_id = ?");
    let payment = sqlx::query_as::<_, Payment>(&sql)
        .bind(order_id)
        .fetch_optional(executor)
        .await?;
    Ok(payment)
}

pub async fn insert(conn: &mut SqliteConnection, payment: &Payment) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO payment (id, order_id, amount, method, reference, paid_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(payment.id)
    .bind(payment.order_id)
    .bind(payment.amount)
    .bind(payment.method)
    .bind(&payment.reference)
    .bind(payment.paid_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM payment WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}
