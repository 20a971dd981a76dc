use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::client::ApiClient;
use crate::errors::StorefrontError;
use crate::events::{Event, EventSender};
use crate::models::{CreateOrderRequest, OrderConfirmation, OrderDetail, OrderRecord};

/// Order service: persists completed checkouts and reads order history.
#[derive(Clone)]
pub struct OrderService {
    client: Arc<ApiClient>,
    events: EventSender,
}

impl OrderService {
    pub fn new(client: Arc<ApiClient>, events: EventSender) -> Self {
        Self { client, events }
    }

    /// Records a completed checkout as a server-side order.
    ///
    /// Called only after the gateway confirmed payment, so every failure
    /// here — network, validation, anything — maps to
    /// [`StorefrontError::OrderRecordingFailed`]: the customer has paid and
    /// must never be told to retry payment. The receipt email is the
    /// shipping address's email when present, else the separately captured
    /// fallback.
    #[instrument(skip(self, request), fields(payment_id = %request.payment_method.gateway_payment_id))]
    pub async fn submit(
        &self,
        mut request: CreateOrderRequest,
    ) -> Result<OrderConfirmation, StorefrontError> {
        if !request.shipping_address.email.trim().is_empty() {
            request.customer_email = request.shipping_address.email.clone();
        }

        let payment_id = request.payment_method.gateway_payment_id.clone();
        let result = self
            .client
            .post::<OrderConfirmation, _>("/orders", &request)
            .await
            .and_then(|envelope| envelope.into_data("record your order"));

        match result {
            Ok(confirmation) => {
                self.events
                    .send_or_log(Event::OrderSubmitted {
                        order_id: confirmation.id.clone(),
                    })
                    .await;
                info!(
                    "Order recorded: {} ({}), receipt to {}",
                    confirmation.id, confirmation.status, request.customer_email
                );
                Ok(confirmation)
            }
            Err(err) => {
                error!("Order recording failed after payment {}: {}", payment_id, err);
                self.events
                    .send_or_log(Event::OrderRecordingFailed {
                        payment_id: payment_id.clone(),
                    })
                    .await;
                Err(StorefrontError::OrderRecordingFailed(err.to_string()))
            }
        }
    }

    /// Lists the signed-in customer's orders, newest first as returned by
    /// the backend.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<OrderRecord>, StorefrontError> {
        self.client
            .get::<Vec<OrderRecord>>("/orders")
            .await?
            .into_data("list your orders")
    }

    /// Fetches one order's full detail for the profile view.
    #[instrument(skip(self))]
    pub async fn get(&self, order_id: &str) -> Result<OrderDetail, StorefrontError> {
        self.client
            .get::<OrderDetail>(&format!("/orders/{}", order_id))
            .await?
            .into_data("load the order")
    }
}
