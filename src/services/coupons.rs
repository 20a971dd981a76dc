use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};

use crate::client::ApiClient;
use crate::errors::StorefrontError;
use crate::events::{Event, EventSender};
use crate::models::{AvailableCoupon, CouponValidation};
use crate::services::pricing;
use crate::session::Session;

/// Coupon service: validates codes against the remote API and keeps the
/// session's applied-coupon state.
///
/// Rejections are values, not errors — see [`CouponValidation`]. Only one
/// coupon may be applied at a time; applying a new one replaces the
/// previous.
#[derive(Clone)]
pub struct CouponService {
    client: Arc<ApiClient>,
    session: Arc<Session>,
    events: EventSender,
}

#[derive(Debug, Serialize)]
struct ValidateCouponRequest {
    code: String,
    subtotal: Decimal,
}

impl CouponService {
    pub fn new(client: Arc<ApiClient>, session: Arc<Session>, events: EventSender) -> Self {
        Self {
            client,
            session,
            events,
        }
    }

    /// Validates a coupon code against a subtotal.
    ///
    /// An empty code short-circuits locally without a network call. The
    /// server's verdict (active, unexpired, minimum purchase met) is
    /// treated as ground truth; any transport failure also lands as an
    /// invalid result carrying a user-facing message.
    #[instrument(skip(self))]
    pub async fn validate(&self, code: &str, subtotal: Decimal) -> CouponValidation {
        let code = code.trim();
        if code.is_empty() {
            return CouponValidation::rejected("Please enter a coupon code.");
        }

        let request = ValidateCouponRequest {
            code: code.to_string(),
            subtotal,
        };

        match self
            .client
            .post::<CouponValidation, _>("/coupons/validate", &request)
            .await
        {
            Ok(envelope) => {
                if envelope.success {
                    envelope
                        .data
                        .unwrap_or_else(|| CouponValidation::rejected("Invalid coupon code."))
                } else {
                    CouponValidation::rejected(
                        envelope
                            .message
                            .unwrap_or_else(|| "Invalid coupon code.".to_string()),
                    )
                }
            }
            Err(err) => CouponValidation::rejected(err.user_message()),
        }
    }

    /// Validates a code against the current cart subtotal and, when valid,
    /// applies it to the session with its computed discount. An invalid
    /// result clears any previously applied coupon, matching the
    /// replace-don't-stack policy.
    ///
    /// # Errors
    ///
    /// Only [`StorefrontError::InvalidState`] when a coupon operation is
    /// already in flight; validation outcomes are returned as values.
    #[instrument(skip(self))]
    pub async fn apply(&self, code: &str) -> Result<CouponValidation, StorefrontError> {
        let _guard = self.session.begin_coupon_operation()?;
        let subtotal = self.session.subtotal();

        let mut validation = self.validate(code, subtotal).await;

        match validation.coupon.clone().filter(|_| validation.valid) {
            Some(coupon) => {
                let discount = pricing::calculate_discount(subtotal, coupon.discount_percentage);
                validation.discount_amount = Some(discount);
                self.session.apply_coupon(coupon.clone(), discount);
                self.events
                    .send_or_log(Event::CouponApplied {
                        code: coupon.code.clone(),
                        discount_amount: discount,
                    })
                    .await;
                info!("Applied coupon {}: discount {}", coupon.code, discount);
            }
            None => {
                self.session.clear_coupon();
                self.events
                    .send_or_log(Event::CouponRejected {
                        code: code.trim().to_string(),
                        message: validation
                            .message
                            .clone()
                            .unwrap_or_else(|| "Invalid coupon code.".to_string()),
                    })
                    .await;
            }
        }

        Ok(validation)
    }

    /// Discards the applied coupon; the discount reverts to zero.
    pub async fn remove(&self) {
        self.session.clear_coupon();
        self.events.send_or_log(Event::CouponCleared).await;
    }

    /// Lists the currently promoted coupons.
    pub async fn available(&self) -> Result<Vec<AvailableCoupon>, StorefrontError> {
        self.client
            .get::<Vec<AvailableCoupon>>("/coupons")
            .await?
            .into_data("list available coupons")
    }

    /// Whether a coupon operation is in flight (drives the Apply button's
    /// disabled state).
    pub fn is_processing(&self) -> bool {
        self.session.is_coupon_processing()
    }
}
