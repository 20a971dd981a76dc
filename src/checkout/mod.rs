//! Three-stage checkout wizard: shipping, order review, payment.

pub mod flow;

pub use flow::{CheckoutFlow, CheckoutOutcome, CheckoutStage, ShippingOutcome};
