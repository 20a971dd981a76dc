//! Domain and wire types for the storefront client.
//!
//! Everything here crosses the JSON boundary to the remote API, so the
//! structs carry `camelCase` renames and stay tolerant of fields the
//! backend adds over time.

pub mod address;
pub mod cart;
pub mod coupon;
pub mod order;
pub mod product;
pub mod review;

pub use address::{NewSavedAddress, SavedAddress, ShippingAddress};
pub use cart::{Cart, CartLineItem, NewCartItem};
pub use coupon::{AvailableCoupon, Coupon, CouponValidation};
pub use order::{
    CreateOrderRequest, OrderConfirmation, OrderDetail, OrderLineSummary, OrderRecord,
    OrderSummary, PaymentConfirmation, PaymentReference,
};
pub use product::{Product, ProductPage, ProductQuery, ProductSort};
pub use review::{NewReview, ProductRef, Review, ReviewAuthor};
