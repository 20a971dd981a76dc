use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

/// Domain events published by the storefront engine.
///
/// Delivered over a bounded channel so the embedding UI can react (badge
/// counts, toasts) without polling session state. Delivery is best-effort:
/// a full or closed channel never fails a commerce operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Cart events
    CartFetched { item_count: u32 },
    CartItemAdded { product_id: String, quantity: u32 },
    CartItemUpdated { product_id: String, quantity: u32 },
    CartItemRemoved { product_id: String },
    CartCleared,

    // Coupon events
    CouponApplied { code: String, discount_amount: Decimal },
    CouponRejected { code: String, message: String },
    CouponCleared,

    // Checkout events
    CheckoutStarted { checkout_id: Uuid },
    ShippingCompleted { checkout_id: Uuid },
    OrderReviewCompleted { checkout_id: Uuid, total: Decimal },
    PaymentAuthorized { checkout_id: Uuid, payment_id: String },
    PaymentCancelled { checkout_id: Uuid },
    CheckoutCompleted { checkout_id: Uuid, order_id: String },

    // Order events
    OrderSubmitted { order_id: String },
    OrderRecordingFailed { payment_id: String },
}

/// Cloneable handle for publishing [`Event`]s.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when no receiver is
    /// listening. Commerce operations never depend on event delivery.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping storefront event: {}", e);
        }
    }
}

/// Creates a bounded event channel of the given capacity.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}
