//! Bridge to the external, separately loaded payment widget.
//!
//! The widget itself (script download, modal rendering, card entry) is an
//! external collaborator behind [`PaymentGateway`]; this module owns the
//! semantics around it: one-time initialization, conversion of the charge
//! amount into minor currency units, and mapping of the widget's outcomes
//! onto the crate's error taxonomy.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::OnceCell;
use tracing::{info, instrument};

use crate::errors::StorefrontError;
use crate::services::pricing;

/// Customer details prefilled into the payment widget.
#[derive(Debug, Clone, Default)]
pub struct CustomerPrefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// A charge handed to the gateway. The amount is already in minor currency
/// units (paise for INR); constructing through [`PaymentRequest::new`] is
/// the only supported path so the rounding step cannot be skipped.
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub amount_minor_units: i64,
    pub currency: String,
    pub merchant_name: String,
    pub description: Option<String>,
    pub prefill: CustomerPrefill,
    pub theme_color: Option<String>,
}

impl PaymentRequest {
    /// Builds a charge request from a major-unit amount, rounding to minor
    /// units (`round(amount * 100)`).
    pub fn new(
        amount: Decimal,
        currency: impl Into<String>,
        merchant_name: impl Into<String>,
        prefill: CustomerPrefill,
    ) -> Result<Self, StorefrontError> {
        Ok(Self {
            amount_minor_units: pricing::to_minor_units(amount)?,
            currency: currency.into(),
            merchant_name: merchant_name.into(),
            description: None,
            prefill,
            theme_color: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_theme_color(mut self, color: impl Into<String>) -> Self {
        self.theme_color = Some(color.into());
        self
    }
}

/// How a payment attempt ended.
///
/// Dismissal is a first-class outcome, not an error: the caller resets its
/// busy state and stays where it was, with no order submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The gateway confirmed the charge and returned its payment id.
    Completed { payment_id: String },
    /// The customer dismissed the modal.
    Cancelled,
}

/// The external payment widget.
///
/// Implementations wrap a real gateway SDK; tests script one. Errors are
/// plain strings here — the adapter owns their mapping into
/// [`StorefrontError`].
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Performs the one-time SDK initialization (script load, key
    /// exchange). The adapter calls this at most once after a success.
    async fn load(&self) -> Result<(), String>;

    /// Opens the payment modal and resolves when the customer completes or
    /// dismisses it.
    async fn open(&self, request: PaymentRequest) -> Result<PaymentOutcome, String>;
}

/// Adapter in front of a [`PaymentGateway`].
///
/// Guarantees the gateway is initialized exactly once (a failed attempt is
/// retried on the next call; a successful one is cached), and translates
/// failures: initialization problems surface as `GatewayUnavailable`,
/// gateway-reported charge errors as `PaymentFailed`.
#[derive(Clone)]
pub struct GatewayAdapter {
    gateway: Arc<dyn PaymentGateway>,
    loaded: Arc<OnceCell<()>>,
}

impl GatewayAdapter {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            gateway,
            loaded: Arc::new(OnceCell::new()),
        }
    }

    async fn ensure_loaded(&self) -> Result<(), StorefrontError> {
        self.loaded
            .get_or_try_init(|| async {
                info!("Initializing payment gateway");
                self.gateway.load().await
            })
            .await
            .map(|_| ())
            .map_err(StorefrontError::GatewayUnavailable)
    }

    /// Opens the payment modal for the given charge.
    #[instrument(skip(self, request), fields(amount_minor_units = request.amount_minor_units))]
    pub async fn collect(&self, request: PaymentRequest) -> Result<PaymentOutcome, StorefrontError> {
        self.ensure_loaded().await?;

        match self.gateway.open(request).await {
            Ok(outcome) => Ok(outcome),
            Err(message) => Err(StorefrontError::PaymentFailed(message)),
        }
    }
}
