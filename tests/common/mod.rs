use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use storefront_client::config::StorefrontConfig;
use storefront_client::events::Event;
use storefront_client::payment::{PaymentGateway, PaymentOutcome, PaymentRequest};
use storefront_client::Storefront;
use tokio::sync::mpsc;
use wiremock::MockServer;

/// Helper harness wiring a storefront engine to a wiremock backend.
pub struct TestStore {
    pub server: MockServer,
    pub storefront: Storefront,
    pub events: mpsc::Receiver<Event>,
}

impl TestStore {
    /// A signed-in store (bearer token configured).
    pub async fn new() -> Self {
        Self::build(Some("test-session-token")).await
    }

    /// An anonymous store (no token).
    #[allow(dead_code)]
    pub async fn anonymous() -> Self {
        Self::build(None).await
    }

    async fn build(token: Option<&str>) -> Self {
        let server = MockServer::start().await;
        let mut config = StorefrontConfig::new(format!("{}/api", server.uri()));
        if let Some(token) = token {
            config = config.with_token(token);
        }

        let (storefront, events) = Storefront::new(config).expect("engine builds");
        Self {
            server,
            storefront,
            events,
        }
    }

    /// Drains currently queued events into a vector.
    #[allow(dead_code)]
    pub fn drain_events(&mut self) -> Vec<Event> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }
}

/// Builds one cart line in the backend's wire shape.
#[allow(dead_code)]
pub fn line_json(product_id: &str, name: &str, price: &str, quantity: u32) -> Value {
    json!({
        "_id": format!("line-{product_id}"),
        "productId": product_id,
        "name": name,
        "subtitle": "",
        "price": price,
        "quantity": quantity,
        "image": format!("https://cdn.example.test/{product_id}.jpg"),
    })
}

/// Wraps cart items in the `{success, data}` envelope with derived totals.
#[allow(dead_code)]
pub fn cart_envelope(items: Vec<Value>, subtotal: &str) -> Value {
    let item_count: u64 = items
        .iter()
        .map(|item| item["quantity"].as_u64().unwrap_or(0))
        .sum();
    json!({
        "success": true,
        "data": {
            "items": items,
            "subtotal": subtotal,
            "itemCount": item_count,
        }
    })
}

/// Scripted payment gateway for checkout tests.
#[allow(dead_code)]
pub struct ScriptedGateway {
    outcome: Box<dyn Fn() -> Result<PaymentOutcome, String> + Send + Sync>,
    pub load_count: AtomicUsize,
    pub open_count: AtomicUsize,
    /// Minor-unit amount of the last charge the gateway saw.
    pub last_amount: Mutex<Option<i64>>,
}

#[allow(dead_code)]
impl ScriptedGateway {
    pub fn paying(payment_id: &str) -> Arc<Self> {
        let payment_id = payment_id.to_string();
        Arc::new(Self {
            outcome: Box::new(move || {
                Ok(PaymentOutcome::Completed {
                    payment_id: payment_id.clone(),
                })
            }),
            load_count: AtomicUsize::new(0),
            open_count: AtomicUsize::new(0),
            last_amount: Mutex::new(None),
        })
    }

    pub fn cancelling() -> Arc<Self> {
        Arc::new(Self {
            outcome: Box::new(|| Ok(PaymentOutcome::Cancelled)),
            load_count: AtomicUsize::new(0),
            open_count: AtomicUsize::new(0),
            last_amount: Mutex::new(None),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        let message = message.to_string();
        Arc::new(Self {
            outcome: Box::new(move || Err(message.clone())),
            load_count: AtomicUsize::new(0),
            open_count: AtomicUsize::new(0),
            last_amount: Mutex::new(None),
        })
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    async fn load(&self) -> Result<(), String> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn open(&self, request: PaymentRequest) -> Result<PaymentOutcome, String> {
        self.open_count.fetch_add(1, Ordering::SeqCst);
        *self.last_amount.lock().unwrap() = Some(request.amount_minor_units);
        (self.outcome)()
    }
}
