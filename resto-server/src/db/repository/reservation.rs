//! Reservation Repository

use super::{RepoError, RepoResult};
use shared::models::{Reservation, ReservationQuery, ReservationStatus};
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, table_id, customer_name, customer_phone, party_size, reserved_at, duration_minutes, status, notes, created_at";

pub async fn find_all(pool: &SqlitePool, query: &ReservationQuery) -> RepoResult<Vec<Reservation>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM reservation \
         WHERE (?1 IS NULL OR table_id = ?1) AND (?2 IS NULL OR status = ?2) \
         AND (?3 IS NULL OR reserved_at >= ?3) AND (?4 IS NULL OR reserved_at < ?4) \
         ORDER BY reserved_at"
    );
    let reservations = sqlx::query_as::<_, Reservation>(&sql)
        .bind(query.table_id)
        .bind(query.status)
        .bind(query.from)
        .bind(query.to)
        .fetch_all(pool)
        .await?;
    Ok(reservations)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<Reservation>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {COLUMNS} FROM reservation WHERE id = ?");
    let reservation = sqlx::query_as::<_, Reservation>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(reservation)
}

/// Open reservations on `table_id` whose interval intersects `[start, end)`
pub async fn find_overlapping<'e, E>(
    executor: E,
    table_id: i64,
    start: i64,
    end: i64,
    exclude_id: Option<i64>,
) -> RepoResult<Vec<Reservation>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {COLUMNS} FROM reservation \
         WHERE table_id = ?1 AND status IN ('PENDING', 'CONFIRMED') \
         AND reserved_at < ?3 AND reserved_at + duration_minutes * 60000 > ?2 \
         AND (?4 IS NULL OR id != ?4)"
    );
    let reservations = sqlx::query_as::<_, Reservation>(&sql)
        .bind(table_id)
        .bind(start)
        .bind(end)
        .bind(exclude_id)
        .fetch_all(executor)
        .await?;
    Ok(reservations)
}

pub async fn insert(conn: &mut SqliteConnection, r: &Reservation) -> RepoResult<Reservation> {
    sqlx::query(
        "INSERT INTO reservation (id, table_id, customer_name, customer_phone, party_size, reserved_at, duration_minutes, status, notes, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(r.id)
    .bind(r.table_id)
    .bind(&r.customer_name)
    .bind(&r.customer_phone)
    .bind(r.party_size)
    .bind(r.reserved_at)
    .bind(r.duration_minutes)
    .bind(r.status)
    .bind(&r.notes)
    .bind(r.created_at)
    .execute(&mut *conn)
    .await?;
    find_by_id(&mut *conn, r.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create reservation".into()))
}

/// Full replacement of the editable fields
pub async fn save(conn: &mut SqliteConnection, r: &Reservation) -> RepoResult<Reservation> {
    let rows = sqlx::query(
        "UPDATE reservation SET table_id = ?, customer_name = ?, customer_phone = ?, party_size = ?, reserved_at = ?, duration_minutes = ?, notes = ? WHERE id = ?",
    )
    .bind(r.table_id)
    .bind(&r.customer_name)
    .bind(&r.customer_phone)
    .bind(r.party_size)
    .bind(r.reserved_at)
    .bind(r.duration_minutes)
    .bind(&r.notes)
    .bind(r.id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Reservation {} not found", r.id)));
    }
    find_by_id(&mut *conn, r.id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Reservation {} not found", r.id)))
}

pub async fn update_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: ReservationStatus,
) -> RepoResult<Reservation> {
    let rows = sqlx::query("UPDATE reservation SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Reservation {id} not found")));
    }
    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Reservation {id} not found")))
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM reservation WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}
