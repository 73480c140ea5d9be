//! Payment recorder
//!
//! An order is paid exactly once: the lookup rejects a second payment with
//! "already paid", and the UNIQUE index on `payment.order_id` rejects a
//! concurrent duplicate that slipped past the lookup.

use shared::message::Notification;
use shared::models::{OrderStatus, Payment, PaymentCreate, PaymentSettle};
use shared::util::{non_blank, now_millis, snowflake_id};
use sqlx::SqlitePool;

use super::service::{load, release_table_if_idle};
use super::status::{self, Transition, TransitionError};
use super::{OrderError, OrderResult, money};
use crate::db::begin_immediate;
use crate::db::repository::{RepoError, dining_table, order, payment};
use crate::services::NotificationBus;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_optional_text};
use shared::models::TableStatus;

#[derive(Clone, Debug)]
pub struct PaymentService {
    pool: SqlitePool,
    notifier: NotificationBus,
}

impl PaymentService {
    pub fn new(pool: SqlitePool, notifier: NotificationBus) -> Self {
        Self { pool, notifier }
    }

    pub async fn list(&self) -> OrderResult<Vec<Payment>> {
        Ok(payment::find_all(&self.pool).await?)
    }

    pub async fn find_by_order(&self, order_id: i64) -> OrderResult<Payment> {
        order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        payment::find_by_order(&self.pool, order_id)
            .await?
            .ok_or(OrderError::NoPaymentForOrder(order_id))
    }

    /// Record the payment of a READY order and mark it PAID
    ///
    /// Checks run in this order: order exists, amount > 0, not already paid,
    /// not cancelled, status guard allows `current → PAID`.
    pub async fn record_payment(&self, data: PaymentCreate) -> OrderResult<Payment> {
        validate_optional_text(&data.reference, "reference", MAX_SHORT_TEXT_LEN)
            .map_err(|e| OrderError::Invalid(e.message))?;

        let mut tx = begin_immediate(&self.pool).await?;
        let current = load(&mut tx, data.order_id).await?;
        money::validate_payment_amount(data.amount)?;

        if payment::find_by_order(&mut *tx, current.id).await?.is_some()
            || current.status == OrderStatus::Paid
        {
            return Err(OrderError::AlreadyPaid(current.id));
        }
        if current.status == OrderStatus::Cancelled {
            return Err(OrderError::Cancelled(current.id));
        }
        match status::transition(current.status, OrderStatus::Paid) {
            Ok(Transition::Change { .. }) => {}
            Ok(Transition::NoOp) => return Err(OrderError::AlreadyPaid(current.id)),
            Err(TransitionError::NotAllowed { .. }) => {
                return Err(OrderError::NotReady {
                    id: current.id,
                    status: current.status,
                });
            }
            Err(e) => return Err(e.into()),
        }

        let now = now_millis();
        let record = Payment {
            id: snowflake_id(),
            order_id: current.id,
            amount: money::to_f64(money::to_decimal(data.amount)),
            method: data.method,
            reference: non_blank(data.reference).unwrap_or_else(generate_reference),
            paid_at: now,
        };
        payment::insert(&mut tx, &record).await.map_err(|e| match e {
            RepoError::Duplicate(_) => OrderError::AlreadyPaid(current.id),
            other => other.into(),
        })?;
        order::update_status(&mut tx, current.id, OrderStatus::Paid, now).await?;
        if let Some(table_id) = current.table_id {
            release_table_if_idle(&mut tx, table_id, current.id).await?;
        }
        tx.commit().await?;

        if !money::money_eq(record.amount, current.total) {
            tracing::warn!(
                order_id = current.id,
                amount = record.amount,
                total = current.total,
                "Payment amount differs from order total"
            );
        }
        tracing::info!(
            order_id = current.id,
            payment_id = record.id,
            amount = record.amount,
            method = ?record.method,
            reference = %record.reference,
            "Payment recorded"
        );
        self.notifier.publish(Notification::OrderStatusChanged {
            order_id: current.id,
            from: current.status,
            to: OrderStatus::Paid,
        });
        Ok(record)
    }

    /// Pay an order for exactly its current total
    pub async fn settle(&self, data: PaymentSettle) -> OrderResult<Payment> {
        let current = order::find_by_id(&self.pool, data.order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(data.order_id))?;
        self.record_payment(PaymentCreate {
            order_id: current.id,
            amount: current.total,
            method: data.method,
            reference: data.reference,
        })
        .await
    }

    /// Remove a payment and put its order back to PENDING
    ///
    /// Compensating action for a payment recorded by mistake. A dine-in
    /// order takes its table again.
    pub async fn delete_payment(&self, id: i64) -> OrderResult<()> {
        let mut tx = begin_immediate(&self.pool).await?;
        let record = payment::find_by_id(&mut *tx, id)
            .await?
            .ok_or(OrderError::PaymentNotFound(id))?;
        let current = load(&mut tx, record.order_id).await?;

        payment::delete(&mut tx, id).await?;
        order::update_status(&mut tx, current.id, OrderStatus::Pending, now_millis()).await?;
        if let Some(table_id) = current.table_id {
            dining_table::update_status(&mut *tx, table_id, TableStatus::Occupied).await?;
        }
        tx.commit().await?;

        tracing::warn!(
            payment_id = id,
            order_id = current.id,
            amount = record.amount,
            "Payment deleted, order reverted to PENDING"
        );
        self.notifier.publish(Notification::OrderStatusChanged {
            order_id: current.id,
            from: current.status,
            to: OrderStatus::Pending,
        });
        Ok(())
    }
}

/// `PAY-` followed by 12 upper-case hex characters
fn generate_reference() -> String {
    let raw = uuid::Uuid::new_v4().simple().to_string();
    format!("PAY-{}", raw[..12].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::{category, menu_item, settings, zone};
    use crate::orders::service::OrderService;
    use shared::models::{
        CategoryCreate, DiningTableCreate, MenuItemCreate, OrderCreate, OrderLineInput, OrderType,
        PaymentMethod, ZoneCreate,
    };

    struct Fixture {
        orders: OrderService,
        payments: PaymentService,
        pool: SqlitePool,
        table_id: i64,
        item_id: i64,
        waiter_id: i64,
    }

    async fn fixture() -> Fixture {
        fixture_on(DbService::in_memory().await.unwrap().pool).await
    }

    async fn fixture_on(pool: SqlitePool) -> Fixture {
        settings::insert_default(&pool, 0.1925).await.unwrap();
        let zone = zone::create(
            &pool,
            ZoneCreate {
                name: "Terrasse".into(),
                description: None,
            },
        )
        .await
        .unwrap();
        let table = dining_table::create(
            &pool,
            DiningTableCreate {
                name: "T7".into(),
                zone_id: zone.id,
                capacity: None,
            },
        )
        .await
        .unwrap();
        let cat = category::create(
            &pool,
            CategoryCreate {
                name: "Boissons".into(),
                description: None,
                sort_order: None,
            },
        )
        .await
        .unwrap();
        let item = menu_item::create(
            &pool,
            MenuItemCreate {
                category_id: cat.id,
                name: "Jus".into(),
                description: None,
                price: 10.0,
                is_available: Some(true),
            },
        )
        .await
        .unwrap();

        let waiter_id = crate::orders::seed_waiter(&pool).await;
        let bus = NotificationBus::new();
        Fixture {
            orders: OrderService::new(pool.clone(), bus.clone()),
            payments: PaymentService::new(pool.clone(), bus),
            pool,
            table_id: table.id,
            item_id: item.id,
            waiter_id,
        }
    }

    /// DINE_IN order with 2 × 10.00, advanced to READY
    async fn ready_order(fx: &Fixture) -> i64 {
        let detail = fx
            .orders
            .create(
                fx.waiter_id,
                OrderCreate {
                    order_type: OrderType::DineIn,
                    table_id: Some(fx.table_id),
                    notes: None,
                    lines: vec![OrderLineInput {
                        menu_item_id: fx.item_id,
                        quantity: 2,
                        notes: None,
                    }],
                },
            )
            .await
            .unwrap();
        let id = detail.order.id;
        fx.orders.change_status(id, OrderStatus::Preparing).await.unwrap();
        fx.orders.change_status(id, OrderStatus::Ready).await.unwrap();
        id
    }

    fn cash(order_id: i64, amount: f64) -> PaymentCreate {
        PaymentCreate {
            order_id,
            amount,
            method: PaymentMethod::Cash,
            reference: None,
        }
    }

    #[tokio::test]
    async fn test_record_payment_once() {
        let fx = fixture().await;
        let id = ready_order(&fx).await;

        let paid = fx.payments.record_payment(cash(id, 23.85)).await.unwrap();
        assert!(paid.reference.starts_with("PAY-"));
        assert_eq!(paid.reference.len(), 16);

        let order = order::find_by_id(&fx.pool, id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        let table = dining_table::find_by_id(&fx.pool, fx.table_id).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Free);

        let err = fx.payments.record_payment(cash(id, 23.85)).await.unwrap_err();
        assert!(matches!(err, OrderError::AlreadyPaid(oid) if oid == id));
        assert!(err.to_string().contains("already paid"));
    }

    #[tokio::test]
    async fn test_payment_requires_ready_order() {
        let fx = fixture().await;
        let id = ready_order(&fx).await;
        // fresh order still PENDING
        let pending = fx
            .orders
            .create(
                fx.waiter_id,
                OrderCreate {
                    order_type: OrderType::Takeaway,
                    table_id: None,
                    notes: None,
                    lines: vec![],
                },
            )
            .await
            .unwrap()
            .order
            .id;

        let err = fx.payments.record_payment(cash(pending, 5.0)).await.unwrap_err();
        assert!(matches!(err, OrderError::NotReady { .. }));
        assert!(fx.payments.record_payment(cash(id, 23.85)).await.is_ok());
    }

    #[tokio::test]
    async fn test_payment_validation_order() {
        let fx = fixture().await;
        let err = fx.payments.record_payment(cash(12345, 10.0)).await.unwrap_err();
        assert!(matches!(err, OrderError::OrderNotFound(12345)));

        let id = ready_order(&fx).await;
        let err = fx.payments.record_payment(cash(id, 0.0)).await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidAmount(_)));

        fx.orders.change_status(id, OrderStatus::Cancelled).await.unwrap();
        let err = fx.payments.record_payment(cash(id, 10.0)).await.unwrap_err();
        assert!(matches!(err, OrderError::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_settle_pays_exact_total() {
        let fx = fixture().await;
        let id = ready_order(&fx).await;
        let paid = fx
            .payments
            .settle(PaymentSettle {
                order_id: id,
                method: PaymentMethod::MobileMoney,
                reference: Some("MM-778".into()),
            })
            .await
            .unwrap();
        assert_eq!(paid.amount, 23.85);
        assert_eq!(paid.reference, "MM-778");
    }

    #[tokio::test]
    async fn test_delete_payment_reverts_to_pending() {
        let fx = fixture().await;
        let id = ready_order(&fx).await;
        let paid = fx.payments.record_payment(cash(id, 23.85)).await.unwrap();

        fx.payments.delete_payment(paid.id).await.unwrap();
        let order = order::find_by_id(&fx.pool, id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(payment::find_by_order(&fx.pool, id).await.unwrap().is_none());
        let table = dining_table::find_by_id(&fx.pool, fx.table_id).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Occupied);

        let err = fx.payments.delete_payment(paid.id).await.unwrap_err();
        assert!(matches!(err, OrderError::PaymentNotFound(_)));
    }

    #[tokio::test]
    async fn test_find_by_order_without_payment_is_not_found() {
        let fx = fixture().await;
        let id = ready_order(&fx).await;

        let err = fx.payments.find_by_order(id).await.unwrap_err();
        assert!(matches!(err, OrderError::NoPaymentForOrder(oid) if oid == id));
        let app: shared::AppError = err.into();
        assert_eq!(app.code, shared::ErrorCode::PaymentNotFound);
        assert_eq!(app.http_status(), http::StatusCode::NOT_FOUND);

        let paid = fx.payments.record_payment(cash(id, 23.85)).await.unwrap();
        assert_eq!(fx.payments.find_by_order(id).await.unwrap().id, paid.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_payments_pay_once() {
        let (db, _dir) = DbService::temp_file().await;
        let fx = fixture_on(db.pool.clone()).await;
        let id = ready_order(&fx).await;

        let (a, b) = tokio::join!(
            fx.payments.record_payment(cash(id, 23.85)),
            fx.payments.record_payment(cash(id, 23.85)),
        );
        let err = match (a, b) {
            (Ok(_), Err(e)) | (Err(e), Ok(_)) => e,
            other => panic!("expected exactly one payment, got {other:?}"),
        };
        assert!(matches!(err, OrderError::AlreadyPaid(oid) if oid == id), "{err:?}");
        assert_eq!(payment::find_all(&fx.pool).await.unwrap().len(), 1);
    }
}
