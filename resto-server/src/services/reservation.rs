//! Reservation service
//!
//! A reservation holds its table for `[reserved_at, reserved_at + duration)`.
//! Only PENDING and CONFIRMED reservations block the slot.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    DiningTable, Reservation, ReservationCreate, ReservationQuery, ReservationStatus,
    ReservationUpdate, TableStatus,
};
use shared::util::{non_blank, now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::begin_immediate;
use crate::db::repository::{RepoError, dining_table, reservation};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text,
};

pub const DEFAULT_DURATION_MINUTES: i32 = 120;
pub const MAX_DURATION_MINUTES: i32 = 24 * 60;
/// 9999-12-31T23:59:59.999Z
const LATEST_RESERVATION_MS: i64 = 253_402_300_799_999;

#[derive(Clone, Debug)]
pub struct ReservationService {
    pool: SqlitePool,
}

impl ReservationService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &ReservationQuery) -> AppResult<Vec<Reservation>> {
        Ok(reservation::find_all(&self.pool, query).await?)
    }

    pub async fn get(&self, id: i64) -> AppResult<Reservation> {
        reservation::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, data: ReservationCreate) -> AppResult<Reservation> {
        validate_required_text(&data.customer_name, "customer_name", MAX_NAME_LEN)?;
        validate_optional_text(&data.customer_phone, "customer_phone", MAX_SHORT_TEXT_LEN)?;
        validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;
        let duration = data.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES);

        let record = Reservation {
            id: snowflake_id(),
            table_id: data.table_id,
            customer_name: data.customer_name.trim().to_string(),
            customer_phone: non_blank(data.customer_phone),
            party_size: data.party_size,
            reserved_at: data.reserved_at,
            duration_minutes: duration,
            status: ReservationStatus::Pending,
            notes: non_blank(data.notes),
            created_at: now_millis(),
        };

        let mut tx = begin_immediate(&self.pool).await.map_err(RepoError::from)?;
        check_slot(&mut tx, &record).await?;
        let created = reservation::insert(&mut tx, &record).await?;
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            reservation_id = created.id,
            table_id = created.table_id,
            reserved_at = created.reserved_at,
            "Reservation created"
        );
        Ok(created)
    }

    /// Edit an open reservation; the merged slot is re-checked
    pub async fn update(&self, id: i64, data: ReservationUpdate) -> AppResult<Reservation> {
        let mut tx = begin_immediate(&self.pool).await.map_err(RepoError::from)?;
        let mut current = load(&mut tx, id).await?;
        if current.status.is_closed() {
            return Err(AppError::validation(format!(
                "Reservation {id} is {:?} and can no longer be edited",
                current.status
            )));
        }

        if let Some(name) = data.customer_name {
            validate_required_text(&name, "customer_name", MAX_NAME_LEN)?;
            current.customer_name = name.trim().to_string();
        }
        if data.customer_phone.is_some() {
            validate_optional_text(&data.customer_phone, "customer_phone", MAX_SHORT_TEXT_LEN)?;
            current.customer_phone = non_blank(data.customer_phone);
        }
        if data.notes.is_some() {
            validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;
            current.notes = non_blank(data.notes);
        }
        let previous_table = current.table_id;
        current.table_id = data.table_id.unwrap_or(current.table_id);
        current.party_size = data.party_size.unwrap_or(current.party_size);
        current.reserved_at = data.reserved_at.unwrap_or(current.reserved_at);
        current.duration_minutes = data.duration_minutes.unwrap_or(current.duration_minutes);

        check_slot(&mut tx, &current).await?;
        let saved = reservation::save(&mut tx, &current).await?;

        // A confirmed reservation moving tables takes its hold along
        if saved.status == ReservationStatus::Confirmed && previous_table != saved.table_id {
            release_table(&mut tx, previous_table).await?;
            hold_table(&mut tx, saved.table_id).await?;
        }
        tx.commit().await.map_err(RepoError::from)?;
        Ok(saved)
    }

    /// Move a reservation through its lifecycle
    ///
    /// PENDING → CONFIRMED | CANCELLED, CONFIRMED → HONORED | CANCELLED.
    /// Same status is a no-op.
    pub async fn change_status(&self, id: i64, status: ReservationStatus) -> AppResult<Reservation> {
        let mut tx = begin_immediate(&self.pool).await.map_err(RepoError::from)?;
        let current = load(&mut tx, id).await?;
        if current.status == status {
            return Ok(current);
        }
        check_transition(current.status, status)?;

        let updated = reservation::update_status(&mut tx, id, status).await?;
        match status {
            ReservationStatus::Confirmed => hold_table(&mut tx, updated.table_id).await?,
            ReservationStatus::Honored | ReservationStatus::Cancelled => {
                release_table(&mut tx, updated.table_id).await?
            }
            ReservationStatus::Pending => {}
        }
        tx.commit().await.map_err(RepoError::from)?;

        tracing::info!(
            reservation_id = id,
            from = ?current.status,
            to = ?status,
            "Reservation status changed"
        );
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = begin_immediate(&self.pool).await.map_err(RepoError::from)?;
        let current = load(&mut tx, id).await?;
        reservation::delete(&mut tx, id).await?;
        if current.status == ReservationStatus::Confirmed {
            release_table(&mut tx, current.table_id).await?;
        }
        tx.commit().await.map_err(RepoError::from)?;
        Ok(())
    }
}

async fn load(conn: &mut SqliteConnection, id: i64) -> AppResult<Reservation> {
    reservation::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Party size, time bounds, duration, table existence and capacity, then overlap
async fn check_slot(conn: &mut SqliteConnection, r: &Reservation) -> AppResult<DiningTable> {
    if r.party_size <= 0 {
        return Err(out_of_range("party_size", "party_size must be positive"));
    }
    if !(0..=LATEST_RESERVATION_MS).contains(&r.reserved_at) {
        return Err(out_of_range(
            "reserved_at",
            "reserved_at must be a millisecond timestamp before year 10000",
        ));
    }
    if !(1..=MAX_DURATION_MINUTES).contains(&r.duration_minutes) {
        return Err(out_of_range(
            "duration_minutes",
            format!("duration_minutes must be between 1 and {MAX_DURATION_MINUTES}"),
        ));
    }
    let ends_at = r
        .ends_at()
        .ok_or_else(|| out_of_range("reserved_at", "reservation end is out of range"))?;

    let table = dining_table::find_by_id(&mut *conn, r.table_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::TableNotFound, format!("Table {} not found", r.table_id))
        })?;
    if r.party_size > table.capacity {
        return Err(AppError::with_message(
            ErrorCode::ReservationCapacityExceeded,
            format!(
                "Party of {} exceeds capacity {} of table {}",
                r.party_size, table.capacity, table.name
            ),
        )
        .with_detail("capacity", table.capacity));
    }

    let clashes =
        reservation::find_overlapping(&mut *conn, r.table_id, r.reserved_at, ends_at, Some(r.id))
            .await?;
    if let Some(clash) = clashes.first() {
        return Err(AppError::with_message(
            ErrorCode::ReservationConflict,
            format!("Table {} is already reserved for this time slot", table.name),
        )
        .with_detail("reservation_id", clash.id));
    }
    Ok(table)
}

async fn hold_table(conn: &mut SqliteConnection, table_id: i64) -> AppResult<()> {
    if let Some(table) = dining_table::find_by_id(&mut *conn, table_id).await?
        && table.status == TableStatus::Free
    {
        dining_table::update_status(&mut *conn, table_id, TableStatus::Reserved).await?;
    }
    Ok(())
}

async fn release_table(conn: &mut SqliteConnection, table_id: i64) -> AppResult<()> {
    if let Some(table) = dining_table::find_by_id(&mut *conn, table_id).await?
        && table.status == TableStatus::Reserved
    {
        dining_table::update_status(&mut *conn, table_id, TableStatus::Free).await?;
    }
    Ok(())
}

fn out_of_range(field: &str, message: impl Into<String>) -> AppError {
    AppError::with_message(ErrorCode::ValueOutOfRange, message).with_detail("field", field)
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ReservationNotFound, format!("Reservation {id} not found"))
}

fn check_transition(from: ReservationStatus, to: ReservationStatus) -> AppResult<()> {
    use ReservationStatus::*;
    match (from, to) {
        (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Honored) | (Confirmed, Cancelled) => {
            Ok(())
        }
        _ => Err(AppError::with_message(
            ErrorCode::ValidationFailed,
            format!("Cannot change reservation from {from:?} to {to:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::zone;
    use shared::models::{DiningTableCreate, ZoneCreate};

    const HOUR: i64 = 3_600_000;
    const T0: i64 = 1_760_000_000_000;

    async fn setup() -> (ReservationService, SqlitePool, i64) {
        setup_on(DbService::in_memory().await.unwrap().pool).await
    }

    async fn setup_on(pool: SqlitePool) -> (ReservationService, SqlitePool, i64) {
        let zone = zone::create(
            &pool,
            ZoneCreate {
                name: "Salle".into(),
                description: None,
            },
        )
        .await
        .unwrap();
        let table = dining_table::create(
            &pool,
            DiningTableCreate {
                name: "T1".into(),
                zone_id: zone.id,
                capacity: Some(4),
            },
        )
        .await
        .unwrap();
        (ReservationService::new(pool.clone()), pool, table.id)
    }

    fn booking(table_id: i64, reserved_at: i64, party_size: i32) -> ReservationCreate {
        ReservationCreate {
            table_id,
            customer_name: "Mme Ngo".into(),
            customer_phone: Some("+237 6 99 00 11 22".into()),
            party_size,
            reserved_at,
            duration_minutes: None,
            notes: None,
        }
    }

    async fn table_status(pool: &SqlitePool, id: i64) -> TableStatus {
        dining_table::find_by_id(pool, id).await.unwrap().unwrap().status
    }

    #[tokio::test]
    async fn test_create_defaults_to_two_hours() {
        let (svc, _, table) = setup().await;
        let r = svc.create(booking(table, T0, 2)).await.unwrap();
        assert_eq!(r.duration_minutes, 120);
        assert_eq!(r.status, ReservationStatus::Pending);
        assert_eq!(r.ends_at(), Some(T0 + 2 * HOUR));
    }

    #[tokio::test]
    async fn test_capacity_and_party_size() {
        let (svc, _, table) = setup().await;
        let err = svc.create(booking(table, T0, 6)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservationCapacityExceeded);
        let err = svc.create(booking(table, T0, 0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        let err = svc.create(booking(999, T0, 2)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }

    #[tokio::test]
    async fn test_overlap_rejected_adjacent_allowed() {
        let (svc, _, table) = setup().await;
        svc.create(booking(table, T0, 2)).await.unwrap();

        let err = svc.create(booking(table, T0 + HOUR, 2)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservationConflict);

        // [T0+2h, T0+4h) touches but does not intersect
        assert!(svc.create(booking(table, T0 + 2 * HOUR, 2)).await.is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_reservation_frees_slot() {
        let (svc, _, table) = setup().await;
        let r = svc.create(booking(table, T0, 2)).await.unwrap();
        svc.change_status(r.id, ReservationStatus::Cancelled).await.unwrap();
        assert!(svc.create(booking(table, T0, 2)).await.is_ok());
    }

    #[tokio::test]
    async fn test_confirm_and_honor_update_table() {
        let (svc, pool, table) = setup().await;
        let r = svc.create(booking(table, T0, 2)).await.unwrap();

        svc.change_status(r.id, ReservationStatus::Confirmed).await.unwrap();
        assert_eq!(table_status(&pool, table).await, TableStatus::Reserved);

        svc.change_status(r.id, ReservationStatus::Honored).await.unwrap();
        assert_eq!(table_status(&pool, table).await, TableStatus::Free);

        let err = svc
            .change_status(r.id, ReservationStatus::Confirmed)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_pending_cannot_be_honored() {
        let (svc, _, table) = setup().await;
        let r = svc.create(booking(table, T0, 2)).await.unwrap();
        assert!(svc.change_status(r.id, ReservationStatus::Honored).await.is_err());
        // same status is a no-op
        let same = svc.change_status(r.id, ReservationStatus::Pending).await.unwrap();
        assert_eq!(same.status, ReservationStatus::Pending);
    }

    #[tokio::test]
    async fn test_update_rechecks_overlap_excluding_self() {
        let (svc, _, table) = setup().await;
        let a = svc.create(booking(table, T0, 2)).await.unwrap();
        let b = svc.create(booking(table, T0 + 3 * HOUR, 2)).await.unwrap();

        // moving within its own slot is fine
        let moved = svc
            .update(
                a.id,
                ReservationUpdate {
                    reserved_at: Some(T0 + HOUR / 2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.reserved_at, T0 + HOUR / 2);

        let err = svc
            .update(
                b.id,
                ReservationUpdate {
                    reserved_at: Some(T0 + HOUR),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ReservationConflict);
    }

    #[tokio::test]
    async fn test_delete_confirmed_releases_table() {
        let (svc, pool, table) = setup().await;
        let r = svc.create(booking(table, T0, 2)).await.unwrap();
        svc.change_status(r.id, ReservationStatus::Confirmed).await.unwrap();
        svc.delete(r.id).await.unwrap();
        assert_eq!(table_status(&pool, table).await, TableStatus::Free);
        assert_eq!(svc.get(r.id).await.unwrap_err().code, ErrorCode::ReservationNotFound);
    }

    #[tokio::test]
    async fn test_out_of_range_start_rejected() {
        let (svc, _, table) = setup().await;
        for reserved_at in [i64::MAX, i64::MAX - 1_000, LATEST_RESERVATION_MS + 1, -1] {
            let err = svc.create(booking(table, reserved_at, 2)).await.unwrap_err();
            assert_eq!(err.code, ErrorCode::ValueOutOfRange, "reserved_at = {reserved_at}");
        }

        let r = svc.create(booking(table, T0, 2)).await.unwrap();
        let err = svc
            .update(
                r.id,
                ReservationUpdate {
                    reserved_at: Some(i64::MAX),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
        assert_eq!(svc.get(r.id).await.unwrap().reserved_at, T0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_bookings_for_one_slot() {
        let (db, _dir) = DbService::temp_file().await;
        let (svc, _, table) = setup_on(db.pool.clone()).await;

        for round in 0..10 {
            let at = T0 + round * 4 * HOUR;
            let (a, b) = tokio::join!(
                svc.create(booking(table, at, 2)),
                svc.create(booking(table, at, 2)),
            );
            let err = match (a, b) {
                (Ok(_), Err(e)) | (Err(e), Ok(_)) => e,
                other => panic!("round {round}: expected one booking, got {other:?}"),
            };
            assert_eq!(err.code, ErrorCode::ReservationConflict);
        }

        let stored = svc
            .list(&ReservationQuery {
                table_id: Some(table),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(stored.len(), 10);
    }
}
