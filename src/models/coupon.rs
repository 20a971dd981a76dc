use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A discount coupon as returned by the remote API.
///
/// Immutable once fetched: the client only applies or discards it, never
/// mutates it. Eligibility is ultimately the server's call; the local
/// helpers exist for display purposes only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub code: String,
    pub discount_percentage: Decimal,
    #[serde(default)]
    pub description: String,
    pub expiry_date: DateTime<Utc>,
    #[serde(default)]
    pub minimum_purchase: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Coupon {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date < now
    }

    /// Local mirror of the server's eligibility rule: active, unexpired,
    /// and the subtotal meets the minimum purchase. The server response is
    /// still treated as ground truth during validation.
    pub fn eligible_for(&self, subtotal: Decimal, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now) && subtotal >= self.minimum_purchase
    }
}

/// Outcome of validating a coupon code against a subtotal.
///
/// Rejections are values, not errors: an invalid code, an ineligible cart,
/// and a transport failure all land here with `valid == false` and a
/// user-facing message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponValidation {
    pub valid: bool,
    #[serde(default)]
    pub coupon: Option<Coupon>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
}

impl CouponValidation {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            coupon: None,
            message: Some(message.into()),
            discount_amount: None,
        }
    }
}

/// A coupon in the promotional listing, with its one-time-use marker.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableCoupon {
    #[serde(flatten)]
    pub coupon: Coupon,
    #[serde(default)]
    pub is_one_time_use: bool,
}
