//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic is done on `Decimal`, then converted back to `f64`
//! (rounded to 2 decimal places) for storage and serialization.

use super::OrderError;
use rust_decimal::prelude::*;
use shared::models::{OrderLine, OrderTotals, Promotion, PromotionKind};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed unit price
pub const MAX_PRICE: f64 = 100_000_000.0;
/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i32 = 9999;
/// Maximum allowed payment amount
pub const MAX_PAYMENT_AMOUNT: f64 = 1_000_000_000.0;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
pub fn require_finite(value: f64, field_name: &str) -> Result<(), OrderError> {
    if !value.is_finite() {
        return Err(OrderError::Invalid(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a menu price (finite, non-negative, bounded)
pub fn validate_price(price: f64) -> Result<(), OrderError> {
    require_finite(price, "price")?;
    if price < 0.0 {
        return Err(OrderError::Invalid(format!(
            "price must be non-negative, got {}",
            price
        )));
    }
    if price > MAX_PRICE {
        return Err(OrderError::Invalid(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, price
        )));
    }
    Ok(())
}

/// Validate a line quantity
pub fn validate_quantity(quantity: i32) -> Result<(), OrderError> {
    if quantity <= 0 {
        return Err(OrderError::InvalidQuantity(quantity));
    }
    if quantity > MAX_QUANTITY {
        return Err(OrderError::Invalid(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, quantity
        )));
    }
    Ok(())
}

/// Validate a payment amount
pub fn validate_payment_amount(amount: f64) -> Result<(), OrderError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(OrderError::InvalidAmount(amount));
    }
    if amount > MAX_PAYMENT_AMOUNT {
        return Err(OrderError::Invalid(format!(
            "payment amount exceeds maximum allowed ({}), got {}",
            MAX_PAYMENT_AMOUNT, amount
        )));
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round_money(value).to_f64().unwrap_or_default()
}

#[inline]
fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Line total: `unit_price × quantity`
pub fn line_total(line: &OrderLine) -> Decimal {
    to_decimal(line.unit_price) * Decimal::from(line.quantity)
}

/// Discount granted by a promotion on `subtotal`
///
/// Fixed amounts are capped at the subtotal so the total never goes negative.
pub fn discount_for(subtotal: Decimal, promotion: &Promotion) -> Decimal {
    let value = to_decimal(promotion.value);
    let discount = match promotion.kind {
        PromotionKind::Percentage => subtotal * value / Decimal::ONE_HUNDRED,
        PromotionKind::FixedAmount => value.min(subtotal),
    };
    round_money(discount.max(Decimal::ZERO))
}

/// Recompute the totals of an order from its lines
///
/// ```text
/// subtotal = Σ unit_price × quantity
/// discount = promotion(subtotal)
/// tax      = (subtotal − discount) × tax_rate
/// total    = subtotal − discount + tax
/// ```
pub fn recalculate(lines: &[OrderLine], tax_rate: f64, promotion: Option<&Promotion>) -> OrderTotals {
    let subtotal = round_money(lines.iter().map(line_total).sum());
    let discount = promotion
        .map(|p| discount_for(subtotal, p))
        .unwrap_or(Decimal::ZERO);
    let taxable = subtotal - discount;
    let tax_amount = round_money(taxable * to_decimal(tax_rate));
    let total = taxable + tax_amount;

    OrderTotals {
        subtotal: to_f64(subtotal),
        discount: to_f64(discount),
        tax_amount: to_f64(tax_amount),
        total: to_f64(total),
    }
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32, unit_price: f64) -> OrderLine {
        OrderLine {
            id: 1,
            order_id: 1,
            menu_item_id: 1,
            quantity,
            unit_price,
            notes: None,
        }
    }

    fn promo(kind: PromotionKind, value: f64) -> Promotion {
        Promotion {
            id: 1,
            code: "PROMO".into(),
            description: None,
            kind,
            value,
            starts_at: 0,
            ends_at: i64::MAX,
            is_active: true,
        }
    }

    #[test]
    fn test_to_decimal_precision() {
        // 0.1 + 0.2 != 0.3 in f64
        let sum = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum), 0.3);
    }

    #[test]
    fn test_rounding_half_up() {
        assert_eq!(to_f64(Decimal::new(1005, 3)), 1.01);
        assert_eq!(to_f64(Decimal::new(-1005, 3)), -1.01);
    }

    #[test]
    fn test_recalculate_reference_case() {
        let totals = recalculate(&[line(2, 10.00)], 0.1925, None);
        assert_eq!(totals.subtotal, 20.00);
        assert_eq!(totals.discount, 0.0);
        assert_eq!(totals.tax_amount, 3.85);
        assert_eq!(totals.total, 23.85);
    }

    #[test]
    fn test_recalculate_empty_order() {
        let totals = recalculate(&[], 0.1925, None);
        assert_eq!(totals, OrderTotals::default());
    }

    #[test]
    fn test_recalculate_many_lines() {
        let lines = [line(3, 0.1), line(1, 0.2), line(2, 1500.0)];
        let totals = recalculate(&lines, 0.0, None);
        assert_eq!(totals.subtotal, 3000.5);
        assert_eq!(totals.total, 3000.5);
    }

    #[test]
    fn test_percentage_promotion_applies_before_tax() {
        let p = promo(PromotionKind::Percentage, 10.0);
        let totals = recalculate(&[line(2, 10.00)], 0.1925, Some(&p));
        assert_eq!(totals.subtotal, 20.00);
        assert_eq!(totals.discount, 2.00);
        assert_eq!(totals.tax_amount, 3.47);
        assert_eq!(totals.total, 21.47);
    }

    #[test]
    fn test_fixed_promotion_capped_at_subtotal() {
        let p = promo(PromotionKind::FixedAmount, 50.0);
        let totals = recalculate(&[line(1, 30.00)], 0.1925, Some(&p));
        assert_eq!(totals.discount, 30.00);
        assert_eq!(totals.tax_amount, 0.0);
        assert_eq!(totals.total, 0.0);
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(matches!(
            validate_quantity(0),
            Err(OrderError::InvalidQuantity(0))
        ));
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(0.01).is_ok());
        assert!(matches!(
            validate_payment_amount(0.0),
            Err(OrderError::InvalidAmount(_))
        ));
        assert!(validate_payment_amount(-5.0).is_err());
        assert!(validate_payment_amount(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(-0.01).is_err());
        assert!(validate_price(f64::INFINITY).is_err());
    }

    #[test]
    fn test_money_eq() {
        assert!(money_eq(0.1 + 0.2, 0.3));
        assert!(!money_eq(10.0, 10.02));
    }
}
