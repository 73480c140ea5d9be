//! Orders and payments
//!
//! - **status**: status-transition guard
//! - **money**: decimal totals recalculation
//! - **service**: order + line operations, each in one SQLite transaction
//! - **payment**: payment recorder and its compensating delete
//!
//! ```text
//! handler → service ──► repository (tx) ──► commit
//!                │
//!                └──► NotificationBus (after commit, best effort)
//! ```

pub mod money;
pub mod payment;
pub mod service;
pub mod status;

pub use status::{Transition, TransitionError};

use crate::db::repository::RepoError;
use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;

/// Order / payment domain errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order {0} not found")]
    OrderNotFound(i64),

    #[error("Order line {0} not found")]
    LineNotFound(i64),

    #[error("Menu item {0} not found")]
    MenuItemNotFound(i64),

    #[error("Menu item {0} is not available")]
    MenuItemUnavailable(i64),

    #[error("Table {0} not found")]
    TableNotFound(i64),

    #[error("A dine-in order requires a table")]
    TableRequired,

    #[error("Order {id} is {status}; lines can only change while PENDING or PREPARING")]
    NotEditable { id: i64, status: OrderStatus },

    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("Order {0} already paid")]
    AlreadyPaid(i64),

    #[error("Order {0} is cancelled")]
    Cancelled(i64),

    #[error("Order {id} is {status}; only READY orders can be paid")]
    NotReady { id: i64, status: OrderStatus },

    #[error("Payment amount must be positive, got {0}")]
    InvalidAmount(f64),

    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(i32),

    #[error("Promotion {0} not found")]
    PromotionNotFound(String),

    #[error("Promotion {0} is not active")]
    PromotionNotActive(String),

    #[error("Payment {0} not found")]
    PaymentNotFound(i64),

    #[error("Order {0} has no payment")]
    NoPaymentForOrder(i64),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::Repo(err.into())
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message).with_detail("order_id", id)
            }
            OrderError::LineNotFound(id) => {
                AppError::with_message(ErrorCode::OrderLineNotFound, message).with_detail("line_id", id)
            }
            OrderError::MenuItemNotFound(id) => {
                AppError::with_message(ErrorCode::MenuItemNotFound, message)
                    .with_detail("menu_item_id", id)
            }
            OrderError::MenuItemUnavailable(id) => {
                AppError::with_message(ErrorCode::MenuItemUnavailable, message)
                    .with_detail("menu_item_id", id)
            }
            OrderError::TableNotFound(id) => {
                AppError::with_message(ErrorCode::TableNotFound, message).with_detail("table_id", id)
            }
            OrderError::TableRequired => AppError::with_message(ErrorCode::OrderTableRequired, message),
            OrderError::NotEditable { id, status } => {
                AppError::with_message(ErrorCode::OrderNotEditable, message)
                    .with_detail("order_id", id)
                    .with_detail("status", status.as_str())
            }
            OrderError::InvalidTransition(_) => {
                AppError::with_message(ErrorCode::InvalidStatusTransition, message)
            }
            OrderError::AlreadyPaid(id) => {
                AppError::with_message(ErrorCode::OrderAlreadyPaid, message).with_detail("order_id", id)
            }
            OrderError::Cancelled(id) => {
                AppError::with_message(ErrorCode::OrderCancelled, message).with_detail("order_id", id)
            }
            OrderError::NotReady { id, status } => {
                AppError::with_message(ErrorCode::PaymentOrderNotReady, message)
                    .with_detail("order_id", id)
                    .with_detail("status", status.as_str())
            }
            OrderError::InvalidAmount(_) => {
                AppError::with_message(ErrorCode::PaymentInvalidAmount, message)
            }
            OrderError::InvalidQuantity(_) | OrderError::Invalid(_) => AppError::validation(message),
            OrderError::PromotionNotFound(code) => {
                AppError::with_message(ErrorCode::PromotionNotFound, message).with_detail("code", code)
            }
            OrderError::PromotionNotActive(code) => {
                AppError::with_message(ErrorCode::PromotionNotActive, message).with_detail("code", code)
            }
            OrderError::PaymentNotFound(id) => {
                AppError::with_message(ErrorCode::PaymentNotFound, message)
                    .with_detail("payment_id", id)
            }
            OrderError::NoPaymentForOrder(order_id) => {
                AppError::with_message(ErrorCode::PaymentNotFound, message)
                    .with_detail("order_id", order_id)
            }
            OrderError::Repo(e) => e.into(),
        }
    }
}

pub type OrderResult<T> = Result<T, OrderError>;

/// Waiter account for order fixtures (`order.server_id` references `user`)
#[cfg(test)]
pub(crate) async fn seed_waiter(pool: &sqlx::SqlitePool) -> i64 {
    use crate::db::repository::user::{self, NewUser};

    user::create(
        pool,
        NewUser {
            username: "awa".into(),
            display_name: "Awa".into(),
            hash_pass: "not-a-real-hash".into(),
            role: shared::models::Role::Serveur,
        },
    )
    .await
    .unwrap()
    .id
}
