use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::StorefrontError;
use crate::models::CartLineItem;

/// Percentage discount on an amount: `amount * percentage / 100`.
///
/// No rounding is applied here; display rounding happens at presentation
/// time only.
pub fn calculate_discount(amount: Decimal, percentage: Decimal) -> Decimal {
    amount * percentage / Decimal::from(100)
}

/// Presentational tax: `subtotal * tax_rate`. Included in displayed prices,
/// never added to the charged total.
pub fn calculate_tax(subtotal: Decimal, tax_rate: Decimal) -> Decimal {
    subtotal * tax_rate
}

/// The charged total: `subtotal - discount + shipping`.
pub fn order_total(subtotal: Decimal, discount_amount: Decimal, shipping_cost: Decimal) -> Decimal {
    subtotal - discount_amount + shipping_cost
}

/// Converts a major-unit amount to the gateway's minor currency units,
/// rounding halves away from zero (`round(amount * 100)`). Skipping the
/// rounding step produces fractional-unit amounts the gateway rejects.
pub fn to_minor_units(amount: Decimal) -> Result<i64, StorefrontError> {
    (amount * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| {
            StorefrontError::PaymentFailed("Charge amount exceeds the supported range.".to_string())
        })
}

/// Converts the configured tax rate into exact decimal form.
pub fn tax_rate_from_f64(rate: f64) -> Decimal {
    Decimal::from_f64_retain(rate).unwrap_or(Decimal::ZERO)
}

/// All monetary figures of a cart at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub shipping_cost: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    /// Computes every figure from the line items, the applied coupon's
    /// percentage (if any), and the presentational tax rate. Shipping is
    /// always free in the current design.
    pub fn compute(
        items: &[CartLineItem],
        discount_percentage: Option<Decimal>,
        tax_rate: Decimal,
    ) -> Self {
        let subtotal: Decimal = items.iter().map(CartLineItem::line_total).sum();
        let discount_amount = discount_percentage
            .map(|percentage| calculate_discount(subtotal, percentage))
            .unwrap_or_default();
        let shipping_cost = Decimal::ZERO;
        let tax = calculate_tax(subtotal, tax_rate);
        let total = order_total(subtotal, discount_amount, shipping_cost);

        Self {
            subtotal,
            discount_amount,
            shipping_cost,
            tax,
            total,
        }
    }
}
