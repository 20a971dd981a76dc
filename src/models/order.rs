use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::address::ShippingAddress;
use super::cart::CartLineItem;
use super::coupon::Coupon;

/// Proof of a settled gateway payment, attached to the order at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub name_on_account: String,
    /// Short display label derived from the gateway reference, e.g.
    /// `gateway_4242` — the storefront never sees a real instrument number.
    pub instrument_label: String,
    pub gateway_payment_id: String,
}

impl PaymentConfirmation {
    /// Builds a confirmation from the gateway's success callback.
    pub fn from_gateway(name_on_account: impl Into<String>, payment_id: impl Into<String>) -> Self {
        let payment_id = payment_id.into();
        let tail_start = payment_id.len().saturating_sub(4);
        Self {
            name_on_account: name_on_account.into(),
            instrument_label: format!("gateway_{}", &payment_id[tail_start..]),
            gateway_payment_id: payment_id,
        }
    }
}

/// Transient aggregate built across the checkout stages.
///
/// Frozen when the order-review stage completes: later cart mutations do
/// not retroactively change an in-flight summary. Discarded client-side
/// after submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub shipping_address: ShippingAddress,
    pub payment: Option<PaymentConfirmation>,
    pub items: Vec<CartLineItem>,
    pub subtotal: Decimal,
    /// Always zero in the current design; kept explicit so the total
    /// invariant stays visible.
    pub shipping_cost: Decimal,
    /// Presentational only: included in displayed prices, never added to
    /// the charged total.
    pub tax: Decimal,
    pub total: Decimal,
    pub applied_coupon: Option<Coupon>,
    pub discount_amount: Decimal,
}

/// Order-creation payload posted to the backend after payment succeeds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub shipping_address: ShippingAddress,
    pub save_shipping_address: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub payment_method: PaymentConfirmation,
    pub customer_email: String,
    pub items: Vec<CartLineItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub discount_amount: Decimal,
}

/// Server acknowledgement of a created order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One line of a past order as shown in the profile list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineSummary {
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
}

/// A past order in the profile list view. Read-only from the client's
/// perspective.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub items: Vec<OrderLineSummary>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Gateway reference attached to a fetched order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReference {
    #[serde(default)]
    pub gateway_payment_id: Option<String>,
}

/// Full detail of one past order, fetched for the order-detail view.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub items: Vec<OrderLineSummary>,
    pub created_at: DateTime<Utc>,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub payment_method: PaymentReference,
}
