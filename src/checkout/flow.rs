use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::StorefrontConfig;
use crate::errors::StorefrontError;
use crate::events::{Event, EventSender};
use crate::models::{
    CreateOrderRequest, OrderSummary, PaymentConfirmation, SavedAddress, ShippingAddress,
};
use crate::payment::{CustomerPrefill, GatewayAdapter, PaymentOutcome, PaymentRequest};
use crate::services::pricing::{self, CartTotals};
use crate::services::{CartService, OrderService};
use crate::session::Session;

/// Checkout wizard stages, in order. Linear: a stage only becomes
/// reachable once every predecessor is marked complete.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
pub enum CheckoutStage {
    Shipping,
    OrderReview,
    Payment,
    Completed,
}

/// Result of submitting the shipping stage.
#[derive(Debug, Clone, Copy)]
pub struct ShippingOutcome {
    /// True when the submitted address matches no saved address exactly
    /// (by street and postal code), so the UI should offer to persist it.
    pub prompt_to_save: bool,
}

/// How a payment attempt concluded the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Payment settled and the order was recorded.
    Completed { order_id: String, payment_id: String },
    /// The customer dismissed the payment modal; the flow stays in the
    /// payment stage with no side effects.
    Cancelled,
}

/// Controller for one checkout session.
///
/// Owns the stage progression and the order-summary snapshot. The summary
/// is frozen when the review stage completes; cart mutations made after
/// that point do not retroactively change an in-flight summary.
pub struct CheckoutFlow {
    id: Uuid,
    config: Arc<StorefrontConfig>,
    session: Arc<Session>,
    cart: CartService,
    orders: OrderService,
    gateway: GatewayAdapter,
    events: EventSender,
    stage: CheckoutStage,
    shipping_completed: bool,
    order_completed: bool,
    shipping_address: Option<ShippingAddress>,
    summary: Option<OrderSummary>,
    processing_payment: bool,
}

impl CheckoutFlow {
    /// Starts a checkout session at the shipping stage.
    pub async fn start(
        config: Arc<StorefrontConfig>,
        session: Arc<Session>,
        cart: CartService,
        orders: OrderService,
        gateway: GatewayAdapter,
        events: EventSender,
    ) -> Self {
        let id = Uuid::new_v4();
        events
            .send_or_log(Event::CheckoutStarted { checkout_id: id })
            .await;
        info!("Checkout started: {}", id);

        Self {
            id,
            config,
            session,
            cart,
            orders,
            gateway,
            events,
            stage: CheckoutStage::Shipping,
            shipping_completed: false,
            order_completed: false,
            shipping_address: None,
            summary: None,
            processing_payment: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stage(&self) -> CheckoutStage {
        self.stage
    }

    pub fn shipping_address(&self) -> Option<&ShippingAddress> {
        self.shipping_address.as_ref()
    }

    /// The frozen order summary, present once the review stage completed.
    pub fn summary(&self) -> Option<&OrderSummary> {
        self.summary.as_ref()
    }

    /// Whether a payment attempt is in flight (drives the pay button's
    /// disabled state).
    pub fn is_processing_payment(&self) -> bool {
        self.processing_payment
    }

    /// Whether a stage's controls may be activated: every predecessor must
    /// be complete.
    pub fn can_access(&self, stage: CheckoutStage) -> bool {
        match stage {
            CheckoutStage::Shipping => true,
            CheckoutStage::OrderReview => self.shipping_completed,
            CheckoutStage::Payment => self.shipping_completed && self.order_completed,
            CheckoutStage::Completed => self.stage == CheckoutStage::Completed,
        }
    }

    /// Makes an accessible stage the active one. Activating a stage whose
    /// predecessors are incomplete is rejected rather than silently
    /// skipped.
    pub fn activate(&mut self, stage: CheckoutStage) -> Result<(), StorefrontError> {
        if stage == CheckoutStage::Completed {
            return Err(StorefrontError::InvalidState(
                "Checkout completes through payment, not by activation.".to_string(),
            ));
        }
        if !self.can_access(stage) {
            return Err(StorefrontError::InvalidState(format!(
                "The {} stage is not reachable yet.",
                stage
            )));
        }
        self.stage = stage;
        Ok(())
    }

    /// Completes the shipping stage with a validated address.
    ///
    /// Reports whether the address is absent from the saved list so the
    /// caller can offer to persist it.
    #[instrument(skip(self, address, saved_addresses))]
    pub async fn submit_shipping(
        &mut self,
        address: ShippingAddress,
        saved_addresses: &[SavedAddress],
    ) -> Result<ShippingOutcome, StorefrontError> {
        if self.stage == CheckoutStage::Completed {
            return Err(StorefrontError::InvalidState(
                "This checkout has already completed.".to_string(),
            ));
        }

        validator::Validate::validate(&address)?;

        let prompt_to_save = !saved_addresses
            .iter()
            .any(|saved| saved.matches_shipping(&address));

        self.shipping_address = Some(address);
        self.shipping_completed = true;
        self.stage = CheckoutStage::OrderReview;
        self.events
            .send_or_log(Event::ShippingCompleted { checkout_id: self.id })
            .await;

        Ok(ShippingOutcome { prompt_to_save })
    }

    /// Completes the review stage, freezing the order summary from the
    /// current cart and coupon state.
    #[instrument(skip(self))]
    pub async fn confirm_order(&mut self) -> Result<OrderSummary, StorefrontError> {
        if !self.shipping_completed {
            return Err(StorefrontError::InvalidState(
                "A shipping address must be submitted before reviewing the order.".to_string(),
            ));
        }
        let shipping_address = self.shipping_address.clone().ok_or_else(|| {
            StorefrontError::InvalidState(
                "A shipping address must be submitted before reviewing the order.".to_string(),
            )
        })?;

        let items = self.session.items();
        if items.is_empty() {
            return Err(StorefrontError::InvalidState(
                "Your cart is empty.".to_string(),
            ));
        }

        let applied_coupon = self.session.applied_coupon();
        let totals = CartTotals::compute(
            &items,
            applied_coupon.as_ref().map(|c| c.discount_percentage),
            pricing::tax_rate_from_f64(self.config.default_tax_rate),
        );

        let summary = OrderSummary {
            shipping_address,
            payment: None,
            items,
            subtotal: totals.subtotal,
            shipping_cost: totals.shipping_cost,
            tax: totals.tax,
            total: totals.total,
            applied_coupon,
            discount_amount: totals.discount_amount,
        };

        self.summary = Some(summary.clone());
        self.order_completed = true;
        self.stage = CheckoutStage::Payment;
        self.events
            .send_or_log(Event::OrderReviewCompleted {
                checkout_id: self.id,
                total: summary.total,
            })
            .await;

        info!(
            "Order review completed: subtotal {}, discount {}, total {}",
            summary.subtotal, summary.discount_amount, summary.total
        );
        Ok(summary)
    }

    /// Collects payment through the gateway and, on success, records the
    /// order and finishes the checkout.
    ///
    /// On completion the cart is cleared (server-side and locally) and the
    /// coupon session state is discarded. Gateway cancellation returns
    /// [`CheckoutOutcome::Cancelled`] with no side effects. A recording
    /// failure after settled payment surfaces as
    /// [`StorefrontError::OrderRecordingFailed`] and leaves the cart
    /// untouched so support can reconcile.
    #[instrument(skip(self))]
    pub async fn place_order(
        &mut self,
        receipt_email: &str,
    ) -> Result<CheckoutOutcome, StorefrontError> {
        if !self.order_completed || self.summary.is_none() {
            return Err(StorefrontError::InvalidState(
                "The order summary must be confirmed before payment.".to_string(),
            ));
        }
        if !validator::validate_email(receipt_email) {
            return Err(StorefrontError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }
        if self.processing_payment {
            return Err(StorefrontError::InvalidState(
                "A payment is already in progress.".to_string(),
            ));
        }

        self.processing_payment = true;
        let result = self.run_payment(receipt_email).await;
        self.processing_payment = false;
        result
    }

    async fn run_payment(
        &mut self,
        receipt_email: &str,
    ) -> Result<CheckoutOutcome, StorefrontError> {
        let mut summary = self.summary.clone().ok_or_else(|| {
            StorefrontError::InvalidState(
                "The order summary must be confirmed before payment.".to_string(),
            )
        })?;
        let customer_name = summary.shipping_address.full_name();

        let mut request = PaymentRequest::new(
            summary.total,
            self.config.currency.clone(),
            self.config.store_name.clone(),
            CustomerPrefill {
                name: customer_name.clone(),
                email: receipt_email.to_string(),
                contact: summary.shipping_address.phone.clone(),
            },
        )?
        .with_description(format!("Order for {}", customer_name));
        if let Some(color) = &self.config.gateway_theme_color {
            request = request.with_theme_color(color.clone());
        }

        let payment_id = match self.gateway.collect(request).await? {
            PaymentOutcome::Completed { payment_id } => payment_id,
            PaymentOutcome::Cancelled => {
                self.events
                    .send_or_log(Event::PaymentCancelled { checkout_id: self.id })
                    .await;
                info!("Payment cancelled by customer");
                return Ok(CheckoutOutcome::Cancelled);
            }
        };

        self.events
            .send_or_log(Event::PaymentAuthorized {
                checkout_id: self.id,
                payment_id: payment_id.clone(),
            })
            .await;

        let confirmation = PaymentConfirmation::from_gateway(customer_name, payment_id.clone());
        summary.payment = Some(confirmation.clone());
        self.summary = Some(summary.clone());

        let order_request = CreateOrderRequest {
            shipping_address: summary.shipping_address.clone(),
            save_shipping_address: false,
            coupon_code: summary.applied_coupon.as_ref().map(|c| c.code.clone()),
            payment_method: confirmation,
            customer_email: receipt_email.to_string(),
            items: summary.items.clone(),
            subtotal: summary.subtotal,
            tax: summary.tax,
            total: summary.total,
            discount_amount: summary.discount_amount,
        };

        // Payment has settled at this point; a submission failure is the
        // recording-failed condition and must leave the cart alone.
        let order = self.orders.submit(order_request).await?;

        if let Err(err) = self.cart.clear().await {
            // Server-side cleanup failed after a recorded order; the local
            // mirror still must not show the purchased items.
            warn!("Cart cleanup after order {} failed: {}", order.id, err);
            self.session.clear_cart();
        }

        self.stage = CheckoutStage::Completed;
        self.events
            .send_or_log(Event::CheckoutCompleted {
                checkout_id: self.id,
                order_id: order.id.clone(),
            })
            .await;

        info!("Checkout {} completed: order {}", self.id, order.id);
        Ok(CheckoutOutcome::Completed {
            order_id: order.id,
            payment_id,
        })
    }
}
