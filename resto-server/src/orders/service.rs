//! Order service
//!
//! Every mutation runs in one SQLite transaction: the line change, the
//! totals recalculation and any table status change commit together.
//! Notifications are published after commit.

use shared::message::Notification;
use shared::models::{
    Order, OrderCreate, OrderDetail, OrderLine, OrderLineInput, OrderLineUpdate, OrderQuery,
    OrderStatus, OrderTotals, OrderType, OrderUpdate, TableStatus,
};
use shared::util::{non_blank, now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

use super::status::{self, Transition};
use super::{OrderError, OrderResult, money};
use crate::db::begin_immediate;
use crate::db::repository::{dining_table, menu_item, order, order_line, promotion, settings};
use crate::services::NotificationBus;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};

#[derive(Clone, Debug)]
pub struct OrderService {
    pool: SqlitePool,
    notifier: NotificationBus,
}

impl OrderService {
    pub fn new(pool: SqlitePool, notifier: NotificationBus) -> Self {
        Self { pool, notifier }
    }

    pub async fn list(&self, query: &OrderQuery) -> OrderResult<Vec<Order>> {
        Ok(order::find_all(&self.pool, query).await?)
    }

    pub async fn get(&self, id: i64) -> OrderResult<OrderDetail> {
        let order = order::find_by_id(&self.pool, id)
            .await?
            .ok_or(OrderError::OrderNotFound(id))?;
        let lines = order_line::find_by_order(&self.pool, id).await?;
        Ok(OrderDetail { order, lines })
    }

    /// Open an order, optionally with its first lines
    ///
    /// DINE_IN needs an existing table, which becomes OCCUPIED.
    pub async fn create(&self, server_id: i64, data: OrderCreate) -> OrderResult<OrderDetail> {
        validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)
            .map_err(|e| OrderError::Invalid(e.message))?;
        for input in &data.lines {
            money::validate_quantity(input.quantity)?;
        }

        let mut tx = begin_immediate(&self.pool).await?;
        let table_id = resolve_table(&mut tx, data.order_type, data.table_id).await?;

        let now = now_millis();
        let new_order = Order {
            id: snowflake_id(),
            table_id,
            server_id,
            order_type: data.order_type,
            status: OrderStatus::Pending,
            subtotal: 0.0,
            discount: 0.0,
            tax_amount: 0.0,
            total: 0.0,
            promotion_id: None,
            notes: non_blank(data.notes),
            created_at: now,
            updated_at: now,
        };
        order::insert(&mut tx, &new_order).await?;

        for input in data.lines {
            insert_line(&mut tx, new_order.id, input).await?;
        }
        let totals = refresh_totals(&mut tx, &new_order).await?;

        if let Some(table_id) = table_id {
            dining_table::update_status(&mut *tx, table_id, TableStatus::Occupied).await?;
        }
        tx.commit().await?;

        tracing::info!(
            order_id = new_order.id,
            server_id,
            order_type = ?new_order.order_type,
            table_id = ?table_id,
            "Order created"
        );
        self.publish_totals(new_order.id, &totals);
        self.get(new_order.id).await
    }

    /// Change type, table or notes of an open order
    pub async fn update(&self, id: i64, data: OrderUpdate) -> OrderResult<Order> {
        validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)
            .map_err(|e| OrderError::Invalid(e.message))?;

        let mut tx = begin_immediate(&self.pool).await?;
        let current = load(&mut tx, id).await?;
        if current.status.is_terminal() {
            return Err(OrderError::NotEditable {
                id,
                status: current.status,
            });
        }

        let order_type = data.order_type.unwrap_or(current.order_type);
        let requested_table = match order_type {
            OrderType::Takeaway => data.table_id,
            OrderType::DineIn => data.table_id.or(current.table_id),
        };
        let table_id = resolve_table(&mut tx, order_type, requested_table).await?;
        let notes = match data.notes {
            Some(n) => non_blank(Some(n)),
            None => current.notes.clone(),
        };

        order::update_header(&mut tx, id, order_type, table_id, notes.as_deref(), now_millis())
            .await?;

        if current.table_id != table_id {
            if let Some(old) = current.table_id {
                release_table_if_idle(&mut tx, old, id).await?;
            }
            if let Some(new) = table_id {
                dining_table::update_status(&mut *tx, new, TableStatus::Occupied).await?;
            }
        }

        let updated = load(&mut tx, id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Delete an order with its lines; PAID orders are kept
    pub async fn delete(&self, id: i64) -> OrderResult<()> {
        let mut tx = begin_immediate(&self.pool).await?;
        let current = load(&mut tx, id).await?;
        if current.status == OrderStatus::Paid {
            return Err(OrderError::AlreadyPaid(id));
        }
        order::delete(&mut tx, id).await?;
        if let Some(table_id) = current.table_id {
            release_table_if_idle(&mut tx, table_id, id).await?;
        }
        tx.commit().await?;

        tracing::info!(order_id = id, "Order deleted");
        Ok(())
    }

    pub async fn add_line(&self, order_id: i64, input: OrderLineInput) -> OrderResult<OrderDetail> {
        money::validate_quantity(input.quantity)?;

        let mut tx = begin_immediate(&self.pool).await?;
        let current = load_editable(&mut tx, order_id).await?;
        let line = insert_line(&mut tx, order_id, input).await?;
        let totals = refresh_totals(&mut tx, &current).await?;
        tx.commit().await?;

        tracing::debug!(order_id, line_id = line.id, menu_item_id = line.menu_item_id, "Line added");
        self.publish_totals(order_id, &totals);
        self.get(order_id).await
    }

    pub async fn update_line(
        &self,
        order_id: i64,
        line_id: i64,
        data: OrderLineUpdate,
    ) -> OrderResult<OrderDetail> {
        if let Some(quantity) = data.quantity {
            money::validate_quantity(quantity)?;
        }
        validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)
            .map_err(|e| OrderError::Invalid(e.message))?;

        let mut tx = begin_immediate(&self.pool).await?;
        let current = load_editable(&mut tx, order_id).await?;
        let line = load_line(&mut tx, order_id, line_id).await?;

        let quantity = data.quantity.unwrap_or(line.quantity);
        let notes = match data.notes {
            Some(n) => non_blank(Some(n)),
            None => line.notes,
        };
        order_line::update(&mut tx, line_id, quantity, notes.as_deref()).await?;
        let totals = refresh_totals(&mut tx, &current).await?;
        tx.commit().await?;

        self.publish_totals(order_id, &totals);
        self.get(order_id).await
    }

    pub async fn remove_line(&self, order_id: i64, line_id: i64) -> OrderResult<OrderDetail> {
        let mut tx = begin_immediate(&self.pool).await?;
        let current = load_editable(&mut tx, order_id).await?;
        load_line(&mut tx, order_id, line_id).await?;
        order_line::delete(&mut tx, line_id).await?;
        let totals = refresh_totals(&mut tx, &current).await?;
        tx.commit().await?;

        self.publish_totals(order_id, &totals);
        self.get(order_id).await
    }

    /// Staff status change (kitchen / floor)
    ///
    /// PAID is reserved to the payment recorder. Cancelling frees the table
    /// when no other open order uses it.
    pub async fn change_status(&self, id: i64, requested: OrderStatus) -> OrderResult<Order> {
        let mut tx = begin_immediate(&self.pool).await?;
        let current = load(&mut tx, id).await?;

        let (from, to) = match status::manual_transition(current.status, requested)? {
            Transition::NoOp => return Ok(current),
            Transition::Change { from, to } => (from, to),
        };

        order::update_status(&mut tx, id, to, now_millis()).await?;
        if to == OrderStatus::Cancelled
            && let Some(table_id) = current.table_id
        {
            release_table_if_idle(&mut tx, table_id, id).await?;
        }
        let updated = load(&mut tx, id).await?;
        tx.commit().await?;

        tracing::info!(order_id = id, %from, %to, "Order status changed");
        self.notifier
            .publish(Notification::OrderStatusChanged { order_id: id, from, to });
        Ok(updated)
    }

    /// Attach a promotion by code and recalculate
    pub async fn apply_promotion(&self, order_id: i64, code: &str) -> OrderResult<OrderDetail> {
        let code = code.trim();
        let mut tx = begin_immediate(&self.pool).await?;
        let current = load_editable(&mut tx, order_id).await?;

        let promo = promotion::find_by_code(&mut *tx, code)
            .await?
            .ok_or_else(|| OrderError::PromotionNotFound(code.to_string()))?;
        if !promo.is_applicable_at(now_millis()) {
            return Err(OrderError::PromotionNotActive(promo.code));
        }

        order::set_promotion(&mut tx, order_id, Some(promo.id)).await?;
        let current = Order {
            promotion_id: Some(promo.id),
            ..current
        };
        let totals = refresh_totals(&mut tx, &current).await?;
        tx.commit().await?;

        tracing::info!(order_id, promotion = %promo.code, discount = totals.discount, "Promotion applied");
        self.publish_totals(order_id, &totals);
        self.get(order_id).await
    }

    pub async fn remove_promotion(&self, order_id: i64) -> OrderResult<OrderDetail> {
        let mut tx = begin_immediate(&self.pool).await?;
        let current = load_editable(&mut tx, order_id).await?;
        order::set_promotion(&mut tx, order_id, None).await?;
        let current = Order {
            promotion_id: None,
            ..current
        };
        let totals = refresh_totals(&mut tx, &current).await?;
        tx.commit().await?;

        self.publish_totals(order_id, &totals);
        self.get(order_id).await
    }

    fn publish_totals(&self, order_id: i64, totals: &OrderTotals) {
        self.notifier.publish(Notification::OrderTotalsUpdated {
            order_id,
            subtotal: totals.subtotal,
            discount: totals.discount,
            tax_amount: totals.tax_amount,
            total: totals.total,
        });
    }
}

// =============================================================================
// Transaction helpers
// =============================================================================

pub(crate) async fn load(conn: &mut SqliteConnection, id: i64) -> OrderResult<Order> {
    order::find_by_id(&mut *conn, id)
        .await?
        .ok_or(OrderError::OrderNotFound(id))
}

async fn load_editable(conn: &mut SqliteConnection, id: i64) -> OrderResult<Order> {
    let current = load(conn, id).await?;
    if !current.status.accepts_line_changes() {
        return Err(OrderError::NotEditable {
            id,
            status: current.status,
        });
    }
    Ok(current)
}

async fn load_line(conn: &mut SqliteConnection, order_id: i64, line_id: i64) -> OrderResult<OrderLine> {
    order_line::find_by_id(&mut *conn, line_id)
        .await?
        .filter(|l| l.order_id == order_id)
        .ok_or(OrderError::LineNotFound(line_id))
}

/// DINE_IN → existing table required; TAKEAWAY → no table
async fn resolve_table(
    conn: &mut SqliteConnection,
    order_type: OrderType,
    table_id: Option<i64>,
) -> OrderResult<Option<i64>> {
    match (order_type, table_id) {
        (OrderType::Takeaway, None) => Ok(None),
        (OrderType::Takeaway, Some(_)) => Err(OrderError::Invalid(
            "A takeaway order cannot reference a table".into(),
        )),
        (OrderType::DineIn, None) => Err(OrderError::TableRequired),
        (OrderType::DineIn, Some(id)) => {
            dining_table::find_by_id(&mut *conn, id)
                .await?
                .ok_or(OrderError::TableNotFound(id))?;
            Ok(Some(id))
        }
    }
}

/// Snapshot the menu price into a new line
async fn insert_line(
    conn: &mut SqliteConnection,
    order_id: i64,
    input: OrderLineInput,
) -> OrderResult<OrderLine> {
    validate_optional_text(&input.notes, "notes", MAX_NOTE_LEN)
        .map_err(|e| OrderError::Invalid(e.message))?;

    let item = menu_item::find_by_id(&mut *conn, input.menu_item_id)
        .await?
        .ok_or(OrderError::MenuItemNotFound(input.menu_item_id))?;
    if !item.is_available {
        return Err(OrderError::MenuItemUnavailable(item.id));
    }

    let line = OrderLine {
        id: snowflake_id(),
        order_id,
        menu_item_id: item.id,
        quantity: input.quantity,
        unit_price: item.price,
        notes: non_blank(input.notes),
    };
    order_line::insert(conn, &line).await?;
    Ok(line)
}

/// Recompute and persist totals from the current lines
pub(crate) async fn refresh_totals(
    conn: &mut SqliteConnection,
    current: &Order,
) -> OrderResult<OrderTotals> {
    let lines = order_line::find_by_order(&mut *conn, current.id).await?;
    let tax_rate = settings::get(&mut *conn)
        .await?
        .map(|s| s.tax_rate)
        .unwrap_or_default();
    let promo = match current.promotion_id {
        Some(pid) => promotion::find_by_id(&mut *conn, pid).await?,
        None => None,
    };

    let totals = money::recalculate(&lines, tax_rate, promo.as_ref());
    order::update_totals(conn, current.id, &totals, now_millis()).await?;
    Ok(totals)
}

/// Free the table unless another open order still sits on it
pub(crate) async fn release_table_if_idle(
    conn: &mut SqliteConnection,
    table_id: i64,
    order_id: i64,
) -> OrderResult<()> {
    if order::count_open_on_table(&mut *conn, table_id, order_id).await? == 0 {
        dining_table::update_status(&mut *conn, table_id, TableStatus::Free).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::{category, zone};
    use shared::models::{
        CategoryCreate, DiningTableCreate, MenuItemCreate, PromotionCreate, PromotionKind,
        ZoneCreate,
    };

    struct Fixture {
        service: OrderService,
        pool: SqlitePool,
        table_id: i64,
        pizza_id: i64,
        waiter_id: i64,
    }

    async fn fixture() -> Fixture {
        let db = DbService::in_memory().await.unwrap();
        let pool = db.pool;
        settings::insert_default(&pool, 0.1925).await.unwrap();

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
        let cat = category::create(
            &pool,
            CategoryCreate {
                name: "Plats".into(),
                description: None,
                sort_order: None,
            },
        )
        .await
        .unwrap();
        let pizza = menu_item::create(
            &pool,
            MenuItemCreate {
                category_id: cat.id,
                name: "Pizza".into(),
                description: None,
                price: 10.0,
                is_available: None,
            },
        )
        .await
        .unwrap();

        let waiter_id = crate::orders::seed_waiter(&pool).await;
        Fixture {
            service: OrderService::new(pool.clone(), NotificationBus::new()),
            pool,
            table_id: table.id,
            pizza_id: pizza.id,
            waiter_id,
        }
    }

    fn dine_in(table_id: i64) -> OrderCreate {
        OrderCreate {
            order_type: OrderType::DineIn,
            table_id: Some(table_id),
            notes: None,
            lines: vec![],
        }
    }

    fn pizza(fx: &Fixture, quantity: i32) -> OrderLineInput {
        OrderLineInput {
            menu_item_id: fx.pizza_id,
            quantity,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_add_line_recalculates_totals() {
        let fx = fixture().await;
        let mut rx = fx.service.notifier.subscribe();
        let created = fx.service.create(fx.waiter_id, dine_in(fx.table_id)).await.unwrap();
        assert_eq!(created.order.total, 0.0);

        let detail = fx.service.add_line(created.order.id, pizza(&fx, 2)).await.unwrap();
        assert_eq!(detail.lines.len(), 1);
        assert_eq!(detail.lines[0].unit_price, 10.0);
        assert_eq!(detail.order.subtotal, 20.00);
        assert_eq!(detail.order.total, 23.85);

        // creation totals, then the line change
        let _ = rx.recv().await.unwrap();
        match rx.recv().await.unwrap() {
            Notification::OrderTotalsUpdated { order_id, total, .. } => {
                assert_eq!(order_id, created.order.id);
                assert_eq!(total, 23.85);
            }
            other => panic!("unexpected notification: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dine_in_occupies_table_and_cancel_frees_it() {
        let fx = fixture().await;
        let created = fx.service.create(fx.waiter_id, dine_in(fx.table_id)).await.unwrap();
        let table = dining_table::find_by_id(&fx.pool, fx.table_id).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Occupied);

        fx.service
            .change_status(created.order.id, OrderStatus::Cancelled)
            .await
            .unwrap();
        let table = dining_table::find_by_id(&fx.pool, fx.table_id).await.unwrap().unwrap();
        assert_eq!(table.status, TableStatus::Free);
    }

    #[tokio::test]
    async fn test_dine_in_requires_table() {
        let fx = fixture().await;
        let err = fx
            .service
            .create(
                fx.waiter_id,
                OrderCreate {
                    order_type: OrderType::DineIn,
                    table_id: None,
                    notes: None,
                    lines: vec![],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::TableRequired));

        let err = fx.service.create(fx.waiter_id, dine_in(999)).await.unwrap_err();
        assert!(matches!(err, OrderError::TableNotFound(999)));
    }

    #[tokio::test]
    async fn test_create_with_lines_rolls_back_on_unknown_item() {
        let fx = fixture().await;
        let mut data = dine_in(fx.table_id);
        data.lines = vec![pizza(&fx, 1), OrderLineInput {
            menu_item_id: 404,
            quantity: 1,
            notes: None,
        }];
        let err = fx.service.create(fx.waiter_id, data).await.unwrap_err();
        assert!(matches!(err, OrderError::MenuItemNotFound(404)));
        assert!(fx.service.list(&OrderQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_guard_through_service() {
        let fx = fixture().await;
        let id = fx.service.create(fx.waiter_id, dine_in(fx.table_id)).await.unwrap().order.id;

        let err = fx.service.change_status(id, OrderStatus::Ready).await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition(status::TransitionError::MustPassThroughPreparing)
        ));

        fx.service.change_status(id, OrderStatus::Preparing).await.unwrap();
        let order = fx.service.change_status(id, OrderStatus::Ready).await.unwrap();
        assert_eq!(order.status, OrderStatus::Ready);

        let err = fx.service.change_status(id, OrderStatus::Paid).await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition(status::TransitionError::PaymentRequired)
        ));
    }

    #[tokio::test]
    async fn test_lines_frozen_once_ready() {
        let fx = fixture().await;
        let id = fx.service.create(fx.waiter_id, dine_in(fx.table_id)).await.unwrap().order.id;
        fx.service.change_status(id, OrderStatus::Preparing).await.unwrap();
        fx.service.add_line(id, pizza(&fx, 1)).await.unwrap();
        fx.service.change_status(id, OrderStatus::Ready).await.unwrap();

        let err = fx.service.add_line(id, pizza(&fx, 1)).await.unwrap_err();
        assert!(matches!(err, OrderError::NotEditable { .. }));
    }

    #[tokio::test]
    async fn test_update_and_remove_line() {
        let fx = fixture().await;
        let id = fx.service.create(fx.waiter_id, dine_in(fx.table_id)).await.unwrap().order.id;
        let detail = fx.service.add_line(id, pizza(&fx, 1)).await.unwrap();
        let line_id = detail.lines[0].id;

        let detail = fx
            .service
            .update_line(
                id,
                line_id,
                OrderLineUpdate {
                    quantity: Some(3),
                    notes: Some("sans oignons".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(detail.order.subtotal, 30.0);
        assert_eq!(detail.lines[0].notes.as_deref(), Some("sans oignons"));

        let detail = fx.service.remove_line(id, line_id).await.unwrap();
        assert!(detail.lines.is_empty());
        assert_eq!(detail.order.total, 0.0);

        let err = fx.service.remove_line(id, line_id).await.unwrap_err();
        assert!(matches!(err, OrderError::LineNotFound(_)));
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let fx = fixture().await;
        let id = fx.service.create(fx.waiter_id, dine_in(fx.table_id)).await.unwrap().order.id;
        let err = fx.service.add_line(id, pizza(&fx, 0)).await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidQuantity(0)));
    }

    #[tokio::test]
    async fn test_promotion_discount_and_removal() {
        let fx = fixture().await;
        promotion::create(
            &fx.pool,
            PromotionCreate {
                code: "MIDI10".into(),
                description: None,
                kind: PromotionKind::Percentage,
                value: 10.0,
                starts_at: 0,
                ends_at: i64::MAX,
                is_active: None,
            },
        )
        .await
        .unwrap();

        let id = fx.service.create(fx.waiter_id, dine_in(fx.table_id)).await.unwrap().order.id;
        fx.service.add_line(id, pizza(&fx, 2)).await.unwrap();

        let detail = fx.service.apply_promotion(id, "MIDI10").await.unwrap();
        assert_eq!(detail.order.discount, 2.0);
        assert_eq!(detail.order.total, 21.47);

        let detail = fx.service.remove_promotion(id).await.unwrap();
        assert_eq!(detail.order.discount, 0.0);
        assert_eq!(detail.order.total, 23.85);

        let err = fx.service.apply_promotion(id, "NOPE").await.unwrap_err();
        assert!(matches!(err, OrderError::PromotionNotFound(_)));
    }

    #[tokio::test]
    async fn test_takeaway_rejects_table() {
        let fx = fixture().await;
        let err = fx
            .service
            .create(
                fx.waiter_id,
                OrderCreate {
                    order_type: OrderType::Takeaway,
                    table_id: Some(fx.table_id),
                    notes: None,
                    lines: vec![],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Invalid(_)));
    }
}
