use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use dashmap::DashMap;
use rust_decimal::Decimal;

use crate::errors::StorefrontError;
use crate::models::{Cart, CartLineItem, Coupon};
use crate::services::pricing;

/// Explicit session-state container for the storefront.
///
/// Replaces the ambient browser-local state of a classic SPA with one owned
/// object and defined read/write access points. Holds the mirrored cart,
/// the applied coupon with its computed discount, and the in-flight
/// operation markers that back per-control busy states.
///
/// State is only ever written by the most recently settled request: the
/// last write wins, with no merge logic for out-of-order responses.
#[derive(Debug, Default)]
pub struct Session {
    items: RwLock<Vec<CartLineItem>>,
    coupon: RwLock<CouponState>,
    processing_items: DashMap<String, ()>,
    coupon_busy: AtomicBool,
}

#[derive(Debug, Default)]
struct CouponState {
    applied: Option<Coupon>,
    discount_amount: Decimal,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cart line items (cloned snapshot).
    pub fn items(&self) -> Vec<CartLineItem> {
        self.read_items().clone()
    }

    /// Sum of all line-item quantities, recomputed on every read. Backs the
    /// cart badge.
    pub fn cart_count(&self) -> u32 {
        self.read_items().iter().map(|item| item.quantity).sum()
    }

    /// Sum of `price * quantity` across all line items, before discount.
    pub fn subtotal(&self) -> Decimal {
        self.read_items().iter().map(CartLineItem::line_total).sum()
    }

    /// The cart as a value, with locally derived totals.
    pub fn cart(&self) -> Cart {
        let items = self.items();
        let subtotal = items.iter().map(CartLineItem::line_total).sum();
        let item_count = items.iter().map(|item| item.quantity).sum();
        Cart {
            items,
            subtotal,
            item_count,
        }
    }

    /// Replaces the mirrored cart with the server's authoritative items and
    /// recomputes the discount of any applied coupon against the new
    /// subtotal. The coupon itself is kept without re-querying the server,
    /// even if the subtotal fell below its minimum purchase.
    pub fn replace_cart(&self, items: Vec<CartLineItem>) {
        let subtotal: Decimal = items.iter().map(CartLineItem::line_total).sum();
        *self.write_items() = items;

        let mut coupon = self.write_coupon();
        if let Some(applied) = &coupon.applied {
            coupon.discount_amount =
                pricing::calculate_discount(subtotal, applied.discount_percentage);
        }
    }

    /// Empties the cart and discards coupon state entirely; the discount
    /// reverts to zero.
    pub fn clear_cart(&self) {
        self.write_items().clear();
        *self.write_coupon() = CouponState::default();
    }

    /// Records a validated coupon and its discount. Only one coupon may be
    /// applied at a time; a new one replaces the previous.
    pub fn apply_coupon(&self, coupon: Coupon, discount_amount: Decimal) {
        *self.write_coupon() = CouponState {
            applied: Some(coupon),
            discount_amount,
        };
    }

    /// Discards the applied coupon; the discount reverts to zero.
    pub fn clear_coupon(&self) {
        *self.write_coupon() = CouponState::default();
    }

    pub fn applied_coupon(&self) -> Option<Coupon> {
        self.read_coupon().applied.clone()
    }

    pub fn discount_amount(&self) -> Decimal {
        self.read_coupon().discount_amount
    }

    /// Marks a cart line as having a mutation in flight. Returns a guard
    /// that releases the marker on drop; a second concurrent mutation of
    /// the same line is rejected so duplicate requests cannot race.
    pub fn begin_item_operation(
        self: &Arc<Self>,
        product_id: &str,
    ) -> Result<ItemOperationGuard, StorefrontError> {
        use dashmap::mapref::entry::Entry;

        match self.processing_items.entry(product_id.to_string()) {
            Entry::Occupied(_) => Err(StorefrontError::InvalidState(format!(
                "An update for this item is already in progress: {}",
                product_id
            ))),
            Entry::Vacant(entry) => {
                entry.insert(());
                Ok(ItemOperationGuard {
                    session: Arc::clone(self),
                    product_id: product_id.to_string(),
                })
            }
        }
    }

    /// Whether a mutation for the given line is in flight (drives control
    /// disabling in the UI).
    pub fn is_item_processing(&self, product_id: &str) -> bool {
        self.processing_items.contains_key(product_id)
    }

    /// Marks the single coupon operation slot busy.
    pub fn begin_coupon_operation(
        self: &Arc<Self>,
    ) -> Result<CouponOperationGuard, StorefrontError> {
        if self
            .coupon_busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(StorefrontError::InvalidState(
                "A coupon is already being applied.".to_string(),
            ));
        }
        Ok(CouponOperationGuard {
            session: Arc::clone(self),
        })
    }

    pub fn is_coupon_processing(&self) -> bool {
        self.coupon_busy.load(Ordering::Acquire)
    }

    fn read_items(&self) -> std::sync::RwLockReadGuard<'_, Vec<CartLineItem>> {
        self.items.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_items(&self) -> std::sync::RwLockWriteGuard<'_, Vec<CartLineItem>> {
        self.items.write().unwrap_or_else(|e| e.into_inner())
    }

    fn read_coupon(&self) -> std::sync::RwLockReadGuard<'_, CouponState> {
        self.coupon.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_coupon(&self) -> std::sync::RwLockWriteGuard<'_, CouponState> {
        self.coupon.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// RAII marker for an in-flight cart line mutation.
#[derive(Debug)]
pub struct ItemOperationGuard {
    session: Arc<Session>,
    product_id: String,
}

impl Drop for ItemOperationGuard {
    fn drop(&mut self) {
        self.session.processing_items.remove(&self.product_id);
    }
}

/// RAII marker for the in-flight coupon operation.
#[derive(Debug)]
pub struct CouponOperationGuard {
    session: Arc<Session>,
}

impl Drop for CouponOperationGuard {
    fn drop(&mut self) {
        self.session.coupon_busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn line(product_id: &str, price: Decimal, quantity: u32) -> CartLineItem {
        CartLineItem {
            product_id: product_id.into(),
            name: "Item".into(),
            subtitle: "".into(),
            price,
            quantity,
            image: "".into(),
        }
    }

    fn save10() -> Coupon {
        Coupon {
            code: "SAVE10".into(),
            discount_percentage: dec!(10),
            description: "10% off".into(),
            expiry_date: Utc::now() + Duration::days(30),
            minimum_purchase: dec!(500),
            is_active: true,
        }
    }

    #[test]
    fn cart_count_sums_quantities() {
        let session = Session::new();
        session.replace_cart(vec![line("a", dec!(100), 1), line("b", dec!(50), 2)]);
        assert_eq!(session.cart_count(), 3);
        assert_eq!(session.subtotal(), dec!(200));
    }

    #[test]
    fn replace_cart_recomputes_applied_discount() {
        let session = Session::new();
        session.replace_cart(vec![line("a", dec!(500), 2)]);
        session.apply_coupon(save10(), dec!(100));
        assert_eq!(session.discount_amount(), dec!(100));

        // Quantity drops; discount follows the new subtotal without a
        // server round trip.
        session.replace_cart(vec![line("a", dec!(500), 1)]);
        assert_eq!(session.discount_amount(), dec!(50.0));
        assert!(session.applied_coupon().is_some());
    }

    #[test]
    fn coupon_survives_subtotal_below_minimum() {
        let session = Session::new();
        session.replace_cart(vec![line("a", dec!(500), 2)]);
        session.apply_coupon(save10(), dec!(100));

        session.replace_cart(vec![line("a", dec!(400), 1)]);
        assert!(session.applied_coupon().is_some());
        assert_eq!(session.discount_amount(), dec!(40.0));
    }

    #[test]
    fn clear_cart_discards_coupon_state() {
        let session = Session::new();
        session.replace_cart(vec![line("a", dec!(1000), 1)]);
        session.apply_coupon(save10(), dec!(100));

        session.clear_cart();
        assert_eq!(session.cart_count(), 0);
        assert!(session.applied_coupon().is_none());
        assert_eq!(session.discount_amount(), Decimal::ZERO);
    }

    #[test]
    fn applying_new_coupon_replaces_previous() {
        let session = Session::new();
        session.replace_cart(vec![line("a", dec!(1000), 1)]);
        session.apply_coupon(save10(), dec!(100));

        let mut bigger = save10();
        bigger.code = "SAVE20".into();
        bigger.discount_percentage = dec!(20);
        session.apply_coupon(bigger, dec!(200));

        assert_eq!(session.applied_coupon().unwrap().code, "SAVE20");
        assert_eq!(session.discount_amount(), dec!(200));
    }

    #[test]
    fn duplicate_item_operation_rejected_until_guard_drops() {
        let session = Arc::new(Session::new());

        let guard = session.begin_item_operation("prod-1").expect("first acquires");
        assert!(session.is_item_processing("prod-1"));
        assert!(session.begin_item_operation("prod-1").is_err());

        // A different line is unaffected.
        let other = session.begin_item_operation("prod-2").expect("other line free");
        drop(other);

        drop(guard);
        assert!(!session.is_item_processing("prod-1"));
        assert!(session.begin_item_operation("prod-1").is_ok());
    }

    #[test]
    fn coupon_operation_slot_is_exclusive() {
        let session = Arc::new(Session::new());
        let guard = session.begin_coupon_operation().expect("acquires");
        assert!(session.is_coupon_processing());
        assert!(session.begin_coupon_operation().is_err());
        drop(guard);
        assert!(!session.is_coupon_processing());
    }
}
