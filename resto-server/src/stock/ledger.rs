//! Stock ledger
//!
//! ```text
//! apply_movement
//!   BEGIN IMMEDIATE                 (write lock; concurrent movements queue)
//!   INSERT stock_movement
//!   balance = Σ IN − Σ OUT          (Decimal, 3 dp)
//!   balance < 0 ? ROLLBACK : UPDATE ingredient.quantity = balance
//!   COMMIT
//!   quantity ≤ threshold ? publish LowStock
//! ```

use rust_decimal::prelude::*;
use shared::message::Notification;
use shared::models::{
    Ingredient, IngredientCreate, IngredientUpdate, LedgerDrift, LedgerTotal, MovementDirection,
    StockAlert, StockCorrection, StockMovement, StockMovementCreate, StockStatus,
};
use shared::util::{non_blank, now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

use super::{StockError, StockResult};
use crate::db::begin_immediate;
use crate::db::repository::{RepoError, ingredient, stock_movement};
use crate::services::NotificationBus;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_non_negative, validate_optional_text,
    validate_required_text,
};

/// Stock quantities keep 3 decimal places (grams of a kilogram)
const QUANTITY_PLACES: u32 = 3;

const INITIAL_STOCK_REASON: &str = "initial stock";
const CORRECTION_REASON: &str = "inventory correction";

#[inline]
fn to_qty(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or_default()
        .round_dp_with_strategy(QUANTITY_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

#[inline]
fn from_qty(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(QUANTITY_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Signed sum of `(direction, quantity)` pairs
pub fn ledger_sum(amounts: &[(MovementDirection, f64)]) -> Decimal {
    amounts
        .iter()
        .map(|(direction, quantity)| match direction {
            MovementDirection::In => to_qty(*quantity),
            MovementDirection::Out => -to_qty(*quantity),
        })
        .sum()
}

fn validate_movement_quantity(quantity: f64) -> StockResult<Decimal> {
    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(StockError::InvalidQuantity(quantity));
    }
    let rounded = to_qty(quantity);
    if rounded.is_zero() {
        return Err(StockError::InvalidQuantity(quantity));
    }
    Ok(rounded)
}

#[derive(Clone, Debug)]
pub struct StockService {
    pool: SqlitePool,
    notifier: NotificationBus,
}

impl StockService {
    pub fn new(pool: SqlitePool, notifier: NotificationBus) -> Self {
        Self { pool, notifier }
    }

    // ========================================================================
    // Ingredients
    // ========================================================================

    pub async fn list_ingredients(&self) -> StockResult<Vec<Ingredient>> {
        Ok(ingredient::find_all(&self.pool).await?)
    }

    pub async fn get_ingredient(&self, id: i64) -> StockResult<Ingredient> {
        ingredient::find_by_id(&self.pool, id)
            .await?
            .ok_or(StockError::IngredientNotFound(id))
    }

    /// Create an ingredient; a positive initial quantity is posted as an IN movement
    pub async fn create_ingredient(&self, data: IngredientCreate) -> StockResult<Ingredient> {
        validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
        validate_required_text(&data.unit, "unit", MAX_SHORT_TEXT_LEN)?;
        let alert_threshold = data.alert_threshold.unwrap_or(0.0);
        validate_non_negative(alert_threshold, "alert_threshold")?;
        let initial = data.quantity.unwrap_or(0.0);
        validate_non_negative(initial, "quantity")?;

        let now = now_millis();
        let name = data.name.trim().to_string();
        let record = Ingredient {
            id: snowflake_id(),
            name: name.clone(),
            quantity: 0.0,
            unit: data.unit.trim().to_string(),
            alert_threshold: from_qty(to_qty(alert_threshold)),
            created_at: now,
            updated_at: now,
        };

        let mut tx = begin_immediate(&self.pool).await?;
        ingredient::insert(&mut tx, &record).await.map_err(|e| match e {
            RepoError::Duplicate(_) => StockError::NameExists(name.clone()),
            other => other.into(),
        })?;
        if to_qty(initial) > Decimal::ZERO {
            post_movement(
                &mut tx,
                &record,
                MovementDirection::In,
                to_qty(initial),
                Some(INITIAL_STOCK_REASON.to_string()),
            )
            .await?;
        }
        let created = load(&mut tx, record.id).await?;
        tx.commit().await?;

        tracing::info!(ingredient_id = created.id, name = %created.name, quantity = created.quantity, "Ingredient created");
        self.alert_if_low(&created);
        Ok(created)
    }

    /// Name, unit or threshold; the quantity only moves through the ledger
    pub async fn update_ingredient(&self, id: i64, data: IngredientUpdate) -> StockResult<Ingredient> {
        if let Some(name) = &data.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        if let Some(unit) = &data.unit {
            validate_required_text(unit, "unit", MAX_SHORT_TEXT_LEN)?;
        }
        if let Some(threshold) = data.alert_threshold {
            validate_non_negative(threshold, "alert_threshold")?;
        }
        let data = IngredientUpdate {
            name: data.name.map(|n| n.trim().to_string()),
            unit: data.unit.map(|u| u.trim().to_string()),
            alert_threshold: data.alert_threshold.map(|t| from_qty(to_qty(t))),
        };
        let name = data.name.clone();

        let updated = ingredient::update(&self.pool, id, data, now_millis())
            .await
            .map_err(|e| match e {
                RepoError::Duplicate(_) => StockError::NameExists(name.unwrap_or_default()),
                RepoError::NotFound(_) => StockError::IngredientNotFound(id),
                other => other.into(),
            })?;
        self.alert_if_low(&updated);
        Ok(updated)
    }

    /// Delete an ingredient that never had a movement
    pub async fn delete_ingredient(&self, id: i64) -> StockResult<()> {
        self.get_ingredient(id).await?;
        if stock_movement::count_by_ingredient(&self.pool, id).await? > 0 {
            return Err(StockError::HasMovements(id));
        }
        ingredient::delete(&self.pool, id).await?;
        tracing::info!(ingredient_id = id, "Ingredient deleted");
        Ok(())
    }

    /// Ingredients at or below their alert threshold
    pub async fn alerts(&self) -> StockResult<Vec<StockAlert>> {
        let low = ingredient::find_low_stock(&self.pool).await?;
        Ok(low.iter().map(StockAlert::from).collect())
    }

    // ========================================================================
    // Ledger
    // ========================================================================

    /// Append a movement and re-derive the cached balance
    ///
    /// An OUT larger than the balance rolls back with `InsufficientStock`
    /// and leaves both the ledger and the cached quantity unchanged.
    pub async fn apply_movement(&self, data: StockMovementCreate) -> StockResult<StockMovement> {
        let quantity = validate_movement_quantity(data.quantity)?;
        validate_optional_text(&data.reason, "reason", MAX_NOTE_LEN)?;

        let mut tx = begin_immediate(&self.pool).await?;
        let current = load(&mut tx, data.ingredient_id).await?;
        let movement = post_movement(
            &mut tx,
            &current,
            data.direction,
            quantity,
            non_blank(data.reason),
        )
        .await?;
        let updated = load(&mut tx, current.id).await?;
        tx.commit().await?;

        tracing::info!(
            ingredient_id = updated.id,
            direction = ?movement.direction,
            quantity = movement.quantity,
            balance = updated.quantity,
            "Stock movement applied"
        );
        self.alert_if_low(&updated);
        Ok(movement)
    }

    /// Post the movement that brings the balance to `counted_quantity`
    ///
    /// Returns `None` when the count already matches.
    pub async fn correct(
        &self,
        ingredient_id: i64,
        data: StockCorrection,
    ) -> StockResult<Option<StockMovement>> {
        validate_non_negative(data.counted_quantity, "counted_quantity")?;
        validate_optional_text(&data.reason, "reason", MAX_NOTE_LEN)?;
        let counted = to_qty(data.counted_quantity);

        let mut tx = begin_immediate(&self.pool).await?;
        let current = load(&mut tx, ingredient_id).await?;
        let balance = ledger_sum(&stock_movement::amounts(&mut *tx, ingredient_id).await?);
        let delta = counted - balance;
        if delta.is_zero() {
            return Ok(None);
        }

        let direction = if delta > Decimal::ZERO {
            MovementDirection::In
        } else {
            MovementDirection::Out
        };
        let reason = non_blank(data.reason).unwrap_or_else(|| CORRECTION_REASON.to_string());
        let movement = post_movement(&mut tx, &current, direction, delta.abs(), Some(reason)).await?;
        let updated = load(&mut tx, ingredient_id).await?;
        tx.commit().await?;

        tracing::info!(
            ingredient_id,
            from = from_qty(balance),
            to = updated.quantity,
            "Stock corrected after inventory count"
        );
        self.alert_if_low(&updated);
        Ok(Some(movement))
    }

    pub async fn movements(&self, ingredient_id: i64) -> StockResult<Vec<StockMovement>> {
        self.get_ingredient(ingredient_id).await?;
        Ok(stock_movement::find_by_ingredient(&self.pool, ingredient_id).await?)
    }

    /// Signed sum of the ingredient's movements, read from the ledger itself
    pub async fn ledger_total(&self, ingredient_id: i64) -> StockResult<LedgerTotal> {
        self.get_ingredient(ingredient_id).await?;
        let amounts = stock_movement::amounts(&self.pool, ingredient_id).await?;
        Ok(LedgerTotal {
            ingredient_id,
            total: from_qty(ledger_sum(&amounts)),
            movement_count: amounts.len() as i64,
        })
    }

    /// Rewrite every cached quantity from its ledger
    ///
    /// Returns the ingredients whose cache disagreed.
    pub async fn reconcile(&self) -> StockResult<Vec<LedgerDrift>> {
        let mut tx = begin_immediate(&self.pool).await?;
        let ingredients = ingredient::find_all(&mut *tx).await?;
        let now = now_millis();
        let mut drifts = Vec::new();

        for item in ingredients {
            let ledger = ledger_sum(&stock_movement::amounts(&mut *tx, item.id).await?);
            if ledger != to_qty(item.quantity) {
                ingredient::set_quantity(&mut tx, item.id, from_qty(ledger), now).await?;
                drifts.push(LedgerDrift {
                    ingredient_id: item.id,
                    name: item.name,
                    cached_quantity: item.quantity,
                    ledger_quantity: from_qty(ledger),
                });
            }
        }
        tx.commit().await?;

        if drifts.is_empty() {
            tracing::debug!("Stock ledger reconciled, no drift");
        } else {
            tracing::warn!(count = drifts.len(), "Stock cache drift corrected");
        }
        Ok(drifts)
    }

    fn alert_if_low(&self, item: &Ingredient) {
        let status = item.stock_status();
        if status == StockStatus::Ok {
            return;
        }
        tracing::warn!(
            ingredient_id = item.id,
            name = %item.name,
            quantity = item.quantity,
            threshold = item.alert_threshold,
            ?status,
            "Low stock"
        );
        self.notifier.publish(Notification::LowStock {
            ingredient_id: item.id,
            name: item.name.clone(),
            quantity: item.quantity,
            alert_threshold: item.alert_threshold,
            status,
        });
    }
}

async fn load(conn: &mut SqliteConnection, id: i64) -> StockResult<Ingredient> {
    ingredient::find_by_id(&mut *conn, id)
        .await?
        .ok_or(StockError::IngredientNotFound(id))
}

/// Insert + re-derive inside the caller's transaction
///
/// The insert comes first so the write lock is held while summing.
async fn post_movement(
    conn: &mut SqliteConnection,
    item: &Ingredient,
    direction: MovementDirection,
    quantity: Decimal,
    reason: Option<String>,
) -> StockResult<StockMovement> {
    let movement = StockMovement {
        id: snowflake_id(),
        ingredient_id: item.id,
        direction,
        quantity: from_qty(quantity),
        reason,
        created_at: now_millis(),
    };
    stock_movement::insert(&mut *conn, &movement).await?;

    let balance = ledger_sum(&stock_movement::amounts(&mut *conn, item.id).await?);
    if balance < Decimal::ZERO {
        return Err(StockError::InsufficientStock {
            ingredient_id: item.id,
            name: item.name.clone(),
            unit: item.unit.clone(),
            available: from_qty(balance + quantity),
            requested: from_qty(quantity),
        });
    }
    ingredient::set_quantity(conn, item.id, from_qty(balance), movement.created_at).await?;
    Ok(movement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn service() -> (StockService, SqlitePool) {
        let pool = DbService::in_memory().await.unwrap().pool;
        (StockService::new(pool.clone(), NotificationBus::new()), pool)
    }

    fn flour(quantity: Option<f64>) -> IngredientCreate {
        IngredientCreate {
            name: "Farine".into(),
            unit: "kg".into(),
            quantity,
            alert_threshold: Some(2.0),
        }
    }

    fn movement(id: i64, direction: MovementDirection, quantity: f64) -> StockMovementCreate {
        StockMovementCreate {
            ingredient_id: id,
            direction,
            quantity,
            reason: None,
        }
    }

    #[test]
    fn test_ledger_sum_is_exact() {
        let amounts = [
            (MovementDirection::In, 0.1),
            (MovementDirection::In, 0.2),
            (MovementDirection::Out, 0.3),
        ];
        assert!(ledger_sum(&amounts).is_zero());
    }

    #[tokio::test]
    async fn test_initial_quantity_is_a_movement() {
        let (svc, _) = service().await;
        let item = svc.create_ingredient(flour(Some(10.0))).await.unwrap();
        assert_eq!(item.quantity, 10.0);

        let moves = svc.movements(item.id).await.unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].direction, MovementDirection::In);
        assert_eq!(moves[0].reason.as_deref(), Some(INITIAL_STOCK_REASON));
    }

    #[tokio::test]
    async fn test_movements_listed_newest_first() {
        let (svc, _) = service().await;
        let item = svc.create_ingredient(flour(Some(5.0))).await.unwrap();
        for (dir, qty) in [(MovementDirection::Out, 1.0), (MovementDirection::In, 4.0)] {
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
            svc.apply_movement(movement(item.id, dir, qty)).await.unwrap();
        }

        let moves = svc.movements(item.id).await.unwrap();
        let got: Vec<_> = moves.iter().map(|m| (m.direction, m.quantity)).collect();
        assert_eq!(
            got,
            vec![
                (MovementDirection::In, 4.0),
                (MovementDirection::Out, 1.0),
                (MovementDirection::In, 5.0),
            ]
        );
        assert!(moves.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn test_cache_matches_ledger_after_movements() {
        let (svc, _) = service().await;
        let item = svc.create_ingredient(flour(Some(5.0))).await.unwrap();
        for (dir, qty) in [
            (MovementDirection::In, 2.25),
            (MovementDirection::Out, 1.5),
            (MovementDirection::Out, 0.125),
            (MovementDirection::In, 10.0),
        ] {
            svc.apply_movement(movement(item.id, dir, qty)).await.unwrap();
        }

        let cached = svc.get_ingredient(item.id).await.unwrap().quantity;
        let ledger = svc.ledger_total(item.id).await.unwrap();
        assert_eq!(cached, 15.625);
        assert_eq!(ledger.total, cached);
        assert_eq!(ledger.movement_count, 5);
    }

    #[tokio::test]
    async fn test_out_beyond_balance_fails_and_changes_nothing() {
        let (svc, _) = service().await;
        let item = svc.create_ingredient(flour(Some(3.0))).await.unwrap();

        let err = svc
            .apply_movement(movement(item.id, MovementDirection::Out, 3.5))
            .await
            .unwrap_err();
        match err {
            StockError::InsufficientStock {
                available,
                requested,
                ..
            } => {
                assert_eq!(available, 3.0);
                assert_eq!(requested, 3.5);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(svc.get_ingredient(item.id).await.unwrap().quantity, 3.0);
        assert_eq!(svc.movements(item.id).await.unwrap().len(), 1);

        // exact balance is allowed
        svc.apply_movement(movement(item.id, MovementDirection::Out, 3.0))
            .await
            .unwrap();
        assert_eq!(svc.get_ingredient(item.id).await.unwrap().quantity, 0.0);
    }

    #[tokio::test]
    async fn test_invalid_quantity_and_unknown_ingredient() {
        let (svc, _) = service().await;
        let item = svc.create_ingredient(flour(None)).await.unwrap();
        let err = svc
            .apply_movement(movement(item.id, MovementDirection::In, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, StockError::InvalidQuantity(_)));

        let err = svc
            .apply_movement(movement(42, MovementDirection::In, 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, StockError::IngredientNotFound(42)));
    }

    #[tokio::test]
    async fn test_low_stock_notification() {
        let (svc, _) = service().await;
        let mut rx = svc.notifier.subscribe();
        let item = svc.create_ingredient(flour(Some(5.0))).await.unwrap();
        svc.apply_movement(movement(item.id, MovementDirection::Out, 4.0))
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            Notification::LowStock {
                ingredient_id,
                status,
                quantity,
                ..
            } => {
                assert_eq!(ingredient_id, item.id);
                assert_eq!(quantity, 1.0);
                assert_eq!(status, StockStatus::Faible);
            }
            other => panic!("unexpected notification: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_correction_moves_balance_to_count() {
        let (svc, _) = service().await;
        let item = svc.create_ingredient(flour(Some(8.0))).await.unwrap();

        let m = svc
            .correct(
                item.id,
                StockCorrection {
                    counted_quantity: 6.5,
                    reason: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(m.direction, MovementDirection::Out);
        assert_eq!(m.quantity, 1.5);
        assert_eq!(svc.get_ingredient(item.id).await.unwrap().quantity, 6.5);

        let none = svc
            .correct(
                item.id,
                StockCorrection {
                    counted_quantity: 6.5,
                    reason: None,
                },
            )
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_reconcile_repairs_drift() {
        let (svc, pool) = service().await;
        let item = svc.create_ingredient(flour(Some(4.0))).await.unwrap();
        assert!(svc.reconcile().await.unwrap().is_empty());

        sqlx::query("UPDATE ingredient SET quantity = 99 WHERE id = ?")
            .bind(item.id)
            .execute(&pool)
            .await
            .unwrap();

        let drifts = svc.reconcile().await.unwrap();
        assert_eq!(drifts.len(), 1);
        assert_eq!(drifts[0].cached_quantity, 99.0);
        assert_eq!(drifts[0].ledger_quantity, 4.0);
        assert_eq!(svc.get_ingredient(item.id).await.unwrap().quantity, 4.0);
    }

    #[tokio::test]
    async fn test_duplicate_name_and_delete_rules() {
        let (svc, _) = service().await;
        let item = svc.create_ingredient(flour(Some(1.0))).await.unwrap();
        let err = svc.create_ingredient(flour(None)).await.unwrap_err();
        assert!(matches!(err, StockError::NameExists(_)));

        let err = svc.delete_ingredient(item.id).await.unwrap_err();
        assert!(matches!(err, StockError::HasMovements(_)));

        let empty = svc
            .create_ingredient(IngredientCreate {
                name: "Sel".into(),
                unit: "kg".into(),
                quantity: None,
                alert_threshold: None,
            })
            .await
            .unwrap();
        svc.delete_ingredient(empty.id).await.unwrap();
        assert!(matches!(
            svc.get_ingredient(empty.id).await.unwrap_err(),
            StockError::IngredientNotFound(_)
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_outs_are_serialized() {
        let (db, _dir) = DbService::temp_file().await;
        let svc = StockService::new(db.pool.clone(), NotificationBus::new());

        for round in 0..10 {
            let item = svc
                .create_ingredient(IngredientCreate {
                    name: format!("Farine {round}"),
                    unit: "kg".into(),
                    quantity: Some(5.0),
                    alert_threshold: None,
                })
                .await
                .unwrap();

            let (a, b) = tokio::join!(
                svc.apply_movement(movement(item.id, MovementDirection::Out, 3.0)),
                svc.apply_movement(movement(item.id, MovementDirection::Out, 3.0)),
            );
            let (ok, err) = match (a, b) {
                (Ok(m), Err(e)) | (Err(e), Ok(m)) => (m, e),
                other => panic!("round {round}: expected one winner, got {other:?}"),
            };
            assert_eq!(ok.quantity, 3.0);
            assert!(
                matches!(err, StockError::InsufficientStock { available, .. } if available == 2.0),
                "round {round}: {err:?}"
            );
            assert_eq!(svc.get_ingredient(item.id).await.unwrap().quantity, 2.0);
        }
    }
}
