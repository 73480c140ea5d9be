//! Ingredient Model

use serde::{Deserialize, Serialize};

/// Stock level relative to the alert threshold
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    Ok,
    /// At or below the threshold
    Faible,
    /// Nothing left
    Rupture,
}

impl StockStatus {
    pub fn evaluate(quantity: f64, alert_threshold: f64) -> Self {
        if quantity <= 0.0 {
            Self::Rupture
        } else if quantity <= alert_threshold {
            Self::Faible
        } else {
            Self::Ok
        }
    }
}

/// Ingredient entity
///
/// `quantity` caches the signed sum of the ingredient's stock movements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub alert_threshold: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Ingredient {
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::evaluate(self.quantity, self.alert_threshold)
    }
}

/// Create ingredient payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientCreate {
    pub name: String,
    pub unit: String,
    /// Posted as an initial IN movement
    pub quantity: Option<f64>,
    pub alert_threshold: Option<f64>,
}

/// Update ingredient payload (quantity only changes through movements)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngredientUpdate {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub alert_threshold: Option<f64>,
}

/// Inventory count correction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockCorrection {
    pub counted_quantity: f64,
    pub reason: Option<String>,
}

/// Low-stock entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockAlert {
    pub ingredient_id: i64,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub alert_threshold: f64,
    pub status: StockStatus,
}

impl From<&Ingredient> for StockAlert {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            ingredient_id: ingredient.id,
            name: ingredient.name.clone(),
            quantity: ingredient.quantity,
            unit: ingredient.unit.clone(),
            alert_threshold: ingredient.alert_threshold,
            status: ingredient.stock_status(),
        }
    }
}

/// Ingredient whose cached quantity disagreed with its ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerDrift {
    pub ingredient_id: i64,
    pub name: String,
    pub cached_quantity: f64,
    pub ledger_quantity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_status_thresholds() {
        assert_eq!(StockStatus::evaluate(0.0, 5.0), StockStatus::Rupture);
        assert_eq!(StockStatus::evaluate(-1.0, 5.0), StockStatus::Rupture);
        assert_eq!(StockStatus::evaluate(5.0, 5.0), StockStatus::Faible);
        assert_eq!(StockStatus::evaluate(2.5, 5.0), StockStatus::Faible);
        assert_eq!(StockStatus::evaluate(5.1, 5.0), StockStatus::Ok);
    }

    #[test]
    fn test_zero_threshold_only_alerts_on_rupture() {
        assert_eq!(StockStatus::evaluate(0.001, 0.0), StockStatus::Ok);
        assert_eq!(StockStatus::evaluate(0.0, 0.0), StockStatus::Rupture);
    }
}
