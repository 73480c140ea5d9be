//! Promotion Model

use serde::{Deserialize, Serialize};

/// How a promotion reduces the subtotal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PromotionKind {
    /// `value` percent off the subtotal
    Percentage,
    /// `value` off the subtotal, capped at the subtotal
    FixedAmount,
}

/// Promotion entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Promotion {
    pub id: i64,
    pub code: String,
    pub description: Option<String>,
    pub kind: PromotionKind,
    pub value: f64,
    pub starts_at: i64,
    pub ends_at: i64,
    pub is_active: bool,
}

impl Promotion {
    /// Active flag set and `now` inside `[starts_at, ends_at]`
    pub fn is_applicable_at(&self, now: i64) -> bool {
        self.is_active && self.starts_at <= now && now <= self.ends_at
    }
}

/// Create promotion payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionCreate {
    pub code: String,
    pub description: Option<String>,
    pub kind: PromotionKind,
    pub value: f64,
    pub starts_at: i64,
    pub ends_at: i64,
    pub is_active: Option<bool>,
}

/// Update promotion payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromotionUpdate {
    pub code: Option<String>,
    pub description: Option<String>,
    pub kind: Option<PromotionKind>,
    pub value: Option<f64>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_applicable_window() {
        let promo = Promotion {
            id: 1,
            code: "LUNCH".into(),
            description: None,
            kind: PromotionKind::Percentage,
            value: 10.0,
            starts_at: 1_000,
            ends_at: 2_000,
            is_active: true,
        };
        assert!(promo.is_applicable_at(1_000));
        assert!(promo.is_applicable_at(2_000));
        assert!(!promo.is_applicable_at(999));
        assert!(!promo.is_applicable_at(2_001));

        let disabled = Promotion { is_active: false, ..promo };
        assert!(!disabled.is_applicable_at(1_500));
    }
}
