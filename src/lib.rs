//! Headless client engine for a direct-to-consumer skincare storefront.
//!
//! This crate owns the client-side commerce logic a storefront UI drives:
//! a cart mirrored from the remote REST API, coupon validation with
//! discount computation, the three-stage checkout wizard, payment-gateway
//! handoff, order submission, and the customer profile data (saved
//! addresses, order history, catalog reads, reviews). It renders nothing
//! and persists nothing: all authoritative state lives behind the remote
//! API, and the embedding application observes local state through the
//! [`session::Session`] accessors and the [`events::Event`] stream.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod checkout;
pub mod client;
pub mod config;
pub mod errors;
pub mod events;
pub mod models;
pub mod payment;
pub mod services;
pub mod session;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::checkout::CheckoutFlow;
use crate::client::ApiClient;
use crate::config::StorefrontConfig;
use crate::errors::StorefrontError;
use crate::events::{Event, EventSender};
use crate::payment::{GatewayAdapter, PaymentGateway};
use crate::services::StorefrontServices;
use crate::session::Session;

/// The assembled storefront engine: one configuration, one API client, one
/// session store, and the services built over them.
///
/// # Examples
///
/// ```ignore
/// let config = config::load_config()?;
/// let (storefront, mut events) = Storefront::new(config)?;
///
/// storefront.services.cart.fetch().await?;
/// println!("{} items in cart", storefront.cart_count());
/// ```
#[derive(Clone)]
pub struct Storefront {
    pub config: Arc<StorefrontConfig>,
    pub client: Arc<ApiClient>,
    pub session: Arc<Session>,
    pub services: StorefrontServices,
    pub events: EventSender,
}

impl Storefront {
    /// Builds the engine from a validated configuration, returning it with
    /// the receiving end of its event stream.
    pub fn new(
        config: StorefrontConfig,
    ) -> Result<(Self, mpsc::Receiver<Event>), StorefrontError> {
        validator::Validate::validate(&config)
            .map_err(|e| StorefrontError::Configuration(e.to_string()))?;

        let config = Arc::new(config);
        let client = Arc::new(ApiClient::new(&config)?);
        let session = Arc::new(Session::new());
        let (events, receiver) = events::channel(config.event_channel_capacity);
        let services = StorefrontServices::new(client.clone(), session.clone(), events.clone());

        Ok((
            Self {
                config,
                client,
                session,
                services,
                events,
            },
            receiver,
        ))
    }

    /// Starts a checkout session against the given payment gateway.
    pub async fn begin_checkout(&self, gateway: Arc<dyn PaymentGateway>) -> CheckoutFlow {
        CheckoutFlow::start(
            self.config.clone(),
            self.session.clone(),
            self.services.cart.clone(),
            self.services.orders.clone(),
            GatewayAdapter::new(gateway),
            self.events.clone(),
        )
        .await
    }

    /// Sum of all line-item quantities in the mirrored cart (badge count).
    pub fn cart_count(&self) -> u32 {
        self.session.cart_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storefront_builds_from_valid_config() {
        let config = StorefrontConfig::new("https://api.example.test/api").with_token("token");
        let (storefront, _events) = Storefront::new(config).expect("engine builds");
        assert!(storefront.client.is_authenticated());
        assert_eq!(storefront.cart_count(), 0);
    }

    #[test]
    fn storefront_rejects_invalid_config() {
        let mut config = StorefrontConfig::new("https://api.example.test/api");
        config.default_tax_rate = 2.0;
        assert!(Storefront::new(config).is_err());
    }
}
