//! Report Repository
//!
//! Read-only aggregates. Time ranges are `[from, to)` in UTC millis and
//! apply to the payment time.

use super::RepoResult;
use shared::models::{MethodTotal, StatusCount, TopItem};
use sqlx::SqlitePool;

/// Raw sales aggregate over paid orders
#[derive(Debug, Clone, Copy, PartialEq, sqlx::FromRow)]
pub struct SalesTotals {
    pub orders_paid: i64,
    pub revenue: f64,
    pub tax_collected: f64,
    pub discounts: f64,
}

pub async fn sales_totals(pool: &SqlitePool, from: i64, to: i64) -> RepoResult<SalesTotals> {
    let totals = sqlx::query_as::<_, SalesTotals>(
        "SELECT COUNT(*) AS orders_paid, \
                CAST(COALESCE(SUM(p.amount), 0) AS REAL) AS revenue, \
                CAST(COALESCE(SUM(o.tax_amount), 0) AS REAL) AS tax_collected, \
                CAST(COALESCE(SUM(o.discount), 0) AS REAL) AS discounts \
         FROM payment p JOIN orders o ON o.id = p.order_id \
         WHERE p.paid_at >= ? AND p.paid_at < ?",
    )
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await?;
    Ok(totals)
}

pub async fn sales_by_method(pool: &SqlitePool, from: i64, to: i64) -> RepoResult<Vec<MethodTotal>> {
    let rows = sqlx::query_as::<_, MethodTotal>(
        "SELECT method, COUNT(*) AS count, CAST(SUM(amount) AS REAL) AS amount \
         FROM payment WHERE paid_at >= ? AND paid_at < ? \
         GROUP BY method ORDER BY amount DESC",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn top_items(pool: &SqlitePool, from: i64, to: i64, limit: i64) -> RepoResult<Vec<TopItem>> {
    let rows = sqlx::query_as::<_, TopItem>(
        "SELECT l.menu_item_id AS menu_item_id, m.name AS name, \
                SUM(l.quantity) AS quantity, \
                CAST(SUM(l.quantity * l.unit_price) AS REAL) AS revenue \
         FROM order_line l \
         JOIN payment p ON p.order_id = l.order_id \
         JOIN menu_item m ON m.id = l.menu_item_id \
         WHERE p.paid_at >= ? AND p.paid_at < ? \
         GROUP BY l.menu_item_id, m.name \
         ORDER BY quantity DESC, revenue DESC \
         LIMIT ?",
    )
    .bind(from)
    .bind(to)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn orders_by_status(pool: &SqlitePool) -> RepoResult<Vec<StatusCount>> {
    let rows = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM orders GROUP BY status ORDER BY status",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    const T0: i64 = 1_760_000_000_000;
    const DAY: i64 = 86_400_000;

    /// Two paid orders inside the first day, one paid exactly at its end,
    /// one still pending.
    async fn seed() -> SqlitePool {
        let pool = DbService::in_memory().await.unwrap().pool;
        for sql in [
            "INSERT INTO user (id, username, display_name, hash_pass, role, created_at) \
             VALUES (1, 'awa', 'Awa', 'x', 'SERVEUR', 0)",
            "INSERT INTO category (id, name) VALUES (1, 'Plats')",
            "INSERT INTO menu_item (id, category_id, name, price) VALUES \
             (1, 1, 'Thieb', 10), (2, 1, 'Yassa', 8), (3, 1, 'Bissap', 2)",
            "INSERT INTO orders (id, server_id, order_type, status, subtotal, discount, tax_amount, total, created_at, updated_at) VALUES \
             (1, 1, 'TAKEAWAY', 'PAID', 20, 0, 2, 20, 0, 0), \
             (2, 1, 'TAKEAWAY', 'PAID', 18, 2, 1.5, 18, 0, 0), \
             (3, 1, 'TAKEAWAY', 'PAID', 30, 0, 3, 30, 0, 0), \
             (4, 1, 'TAKEAWAY', 'PENDING', 10, 0, 1, 10, 0, 0)",
            "INSERT INTO order_line (order_id, menu_item_id, quantity, unit_price) VALUES \
             (1, 1, 1, 10), (1, 3, 5, 2), \
             (2, 2, 2, 8), (2, 3, 1, 2), \
             (3, 1, 3, 10), \
             (4, 1, 1, 10)",
        ] {
            sqlx::query(sql).execute(&pool).await.unwrap();
        }
        for (order_id, amount, method, paid_at) in [
            (1, 20.0, "CASH", T0),
            (2, 18.0, "CARD", T0 + 1_000),
            (3, 30.0, "CASH", T0 + DAY),
        ] {
            sqlx::query(
                "INSERT INTO payment (order_id, amount, method, reference, paid_at) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(order_id)
            .bind(amount)
            .bind(method)
            .bind(format!("PAY-{order_id}"))
            .bind(paid_at)
            .execute(&pool)
            .await
            .unwrap();
        }
        pool
    }

    #[tokio::test]
    async fn test_sales_totals_over_half_open_range() {
        let pool = seed().await;

        let day = sales_totals(&pool, T0, T0 + DAY).await.unwrap();
        assert_eq!(
            day,
            SalesTotals {
                orders_paid: 2,
                revenue: 38.0,
                tax_collected: 3.5,
                discounts: 2.0,
            }
        );

        // `from` is inclusive, `to` is exclusive
        let first = sales_totals(&pool, T0, T0 + 1).await.unwrap();
        assert_eq!((first.orders_paid, first.revenue), (1, 20.0));
        let edge = sales_totals(&pool, T0 + DAY, T0 + 2 * DAY).await.unwrap();
        assert_eq!((edge.orders_paid, edge.revenue), (1, 30.0));

        let empty = sales_totals(&pool, 0, T0).await.unwrap();
        assert_eq!(empty.orders_paid, 0);
        assert_eq!(empty.revenue, 0.0);
    }

    #[tokio::test]
    async fn test_sales_by_method_sorted_by_amount() {
        let pool = seed().await;

        let day = sales_by_method(&pool, T0, T0 + DAY).await.unwrap();
        let got: Vec<_> = day.iter().map(|m| (m.method.as_str(), m.count, m.amount)).collect();
        assert_eq!(got, vec![("CASH", 1, 20.0), ("CARD", 1, 18.0)]);

        let all = sales_by_method(&pool, T0, T0 + 2 * DAY).await.unwrap();
        let got: Vec<_> = all.iter().map(|m| (m.method.as_str(), m.count, m.amount)).collect();
        assert_eq!(got, vec![("CASH", 2, 50.0), ("CARD", 1, 18.0)]);
    }

    #[tokio::test]
    async fn test_top_items_by_quantity_then_revenue() {
        let pool = seed().await;

        let day = top_items(&pool, T0, T0 + DAY, 10).await.unwrap();
        let got: Vec<_> = day.iter().map(|t| (t.name.as_str(), t.quantity, t.revenue)).collect();
        assert_eq!(
            got,
            vec![("Bissap", 6, 12.0), ("Yassa", 2, 16.0), ("Thieb", 1, 10.0)]
        );

        // Pending order lines never count
        let all = top_items(&pool, T0, T0 + 2 * DAY, 2).await.unwrap();
        let got: Vec<_> = all.iter().map(|t| (t.name.as_str(), t.quantity)).collect();
        assert_eq!(got, vec![("Bissap", 6), ("Thieb", 4)]);
    }

    #[tokio::test]
    async fn test_orders_by_status() {
        let pool = seed().await;
        let counts = orders_by_status(&pool).await.unwrap();
        let got: Vec<_> = counts.iter().map(|c| (c.status.as_str(), c.count)).collect();
        assert_eq!(got, vec![("PAID", 3), ("PENDING", 1)]);
    }
}
