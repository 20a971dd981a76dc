//! Thin service wrappers over the remote REST API.
//!
//! Each service owns one concern, holds the shared [`ApiClient`] and
//! [`Session`] behind `Arc`s, and publishes domain events instead of
//! talking to the UI directly.

pub mod addresses;
pub mod cart;
pub mod coupons;
pub mod orders;
pub mod pricing;
pub mod products;
pub mod reviews;

pub use addresses::AddressService;
pub use cart::CartService;
pub use coupons::CouponService;
pub use orders::OrderService;
pub use products::ProductCatalogService;
pub use reviews::ReviewService;

use std::sync::Arc;

use crate::client::ApiClient;
use crate::events::EventSender;
use crate::session::Session;

/// All storefront services, constructed over one shared client, session,
/// and event pipe.
#[derive(Clone)]
pub struct StorefrontServices {
    pub cart: CartService,
    pub coupons: CouponService,
    pub orders: OrderService,
    pub addresses: AddressService,
    pub products: ProductCatalogService,
    pub reviews: ReviewService,
}

impl StorefrontServices {
    pub fn new(client: Arc<ApiClient>, session: Arc<Session>, events: EventSender) -> Self {
        Self {
            cart: CartService::new(client.clone(), session.clone(), events.clone()),
            coupons: CouponService::new(client.clone(), session, events.clone()),
            orders: OrderService::new(client.clone(), events),
            addresses: AddressService::new(client.clone()),
            products: ProductCatalogService::new(client.clone()),
            reviews: ReviewService::new(client),
        }
    }
}
