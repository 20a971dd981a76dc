use reqwest::StatusCode;
use serde::Serialize;

/// Error taxonomy for the storefront client.
///
/// Every operation in this crate fails with one of these variants; none of
/// them is expected to crash the embedding application. The intended
/// handling is to surface [`StorefrontError::user_message`] as a transient
/// notification and leave retry decisions to the user.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum StorefrontError {
    /// Client-side input failed minimum constraints. No network call was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation needs a signed-in session.
    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    /// Transport or connectivity failure talking to the remote API.
    #[error("Network error: {0}")]
    Network(
        #[from]
        #[serde(skip)]
        reqwest::Error,
    ),

    /// Well-formed request, rejected by a backend business rule.
    #[error("Request rejected: {0}")]
    ServerRejected(String),

    /// The requested resource does not exist server-side.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A checkout or cart transition was attempted out of order.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The payment widget could not be initialized.
    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// The payment gateway reported a failure.
    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    /// Payment succeeded but the order could not be persisted. Highest
    /// severity: must never be retried automatically or presented as a
    /// reason to pay again.
    #[error("Order recording failed: {0}")]
    OrderRecordingFailed(String),

    /// A response body did not match the expected wire shape.
    #[error("Serialization error: {0}")]
    Serialization(
        #[from]
        #[serde(skip)]
        serde_json::Error,
    ),

    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<validator::ValidationErrors> for StorefrontError {
    fn from(err: validator::ValidationErrors) -> Self {
        StorefrontError::Validation(err.to_string())
    }
}

impl StorefrontError {
    /// Maps a non-success HTTP status plus the backend's message into the
    /// matching taxonomy variant. This is the single place status codes are
    /// interpreted.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                StorefrontError::AuthenticationRequired(message)
            }
            StatusCode::NOT_FOUND => StorefrontError::NotFound(message),
            _ => StorefrontError::ServerRejected(message),
        }
    }

    /// Whether this failure means the caller must sign in first.
    pub fn is_authentication(&self) -> bool {
        matches!(self, StorefrontError::AuthenticationRequired(_))
    }

    /// Returns the message suitable for end-user notifications.
    ///
    /// Transport and decoding failures return generic text so connection
    /// internals never leak into the UI. `OrderRecordingFailed` carries the
    /// support wording required by the checkout flow: the customer must not
    /// be told to retry payment.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "A network error occurred. Please check your connection and try again.".to_string(),
            Self::Serialization(_) => "The store returned an unexpected response. Please try again.".to_string(),
            Self::Configuration(_) => "The storefront is misconfigured. Please contact support.".to_string(),
            Self::OrderRecordingFailed(_) => {
                "Your payment was successful, but there was an issue saving your order. Please contact support — do not attempt to pay again.".to_string()
            }
            Self::GatewayUnavailable(_) => "The payment service could not be reached. Please try again.".to_string(),
            Self::Validation(msg)
            | Self::AuthenticationRequired(msg)
            | Self::ServerRejected(msg)
            | Self::NotFound(msg)
            | Self::InvalidState(msg)
            | Self::PaymentFailed(msg) => msg.clone(),
        }
    }
}
