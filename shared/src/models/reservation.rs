//! Reservation Model

use serde::{Deserialize, Serialize};

/// Reservation status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    Honored,
}

impl ReservationStatus {
    /// Cancelled and honored reservations no longer hold the table
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Honored)
    }
}

/// Reservation entity
///
/// Holds the table for `[reserved_at, reserved_at + duration_minutes)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    pub table_id: i64,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub party_size: i32,
    pub reserved_at: i64,
    pub duration_minutes: i32,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    pub created_at: i64,
}

impl Reservation {
    /// End of the slot (exclusive), `None` on overflow
    pub fn ends_at(&self) -> Option<i64> {
        i64::from(self.duration_minutes)
            .checked_mul(60_000)
            .and_then(|duration| self.reserved_at.checked_add(duration))
    }
}

/// Create reservation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub table_id: i64,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub party_size: i32,
    pub reserved_at: i64,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
}

/// Update reservation payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationUpdate {
    pub table_id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub party_size: Option<i32>,
    pub reserved_at: Option<i64>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
}

/// Status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationStatusUpdate {
    pub status: ReservationStatus,
}

/// List filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationQuery {
    pub table_id: Option<i64>,
    pub status: Option<ReservationStatus>,
    pub from: Option<i64>,
    pub to: Option<i64>,
}
