use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One product entry in the cart, with its own quantity.
///
/// Unique per `product_id` within a cart; the server merges duplicate adds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub product_id: String,
    pub name: String,
    #[serde(default)]
    pub subtitle: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub image: String,
}

impl CartLineItem {
    /// `price * quantity` for this line.
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// The authoritative cart as returned by the remote API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartLineItem>,
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub item_count: u32,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `price * quantity` across all line items, recomputed locally.
    pub fn computed_subtotal(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Sum of all line-item quantities, recomputed locally. Must always
    /// equal `item_count` as reported by the server.
    pub fn computed_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Payload for adding a product to the cart.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(length(min = 1))]
    pub name: String,
    pub subtitle: String,
    pub price: Decimal,
    #[validate(range(min = 1))]
    pub quantity: u32,
    pub image: String,
}
