//! Payment gateway adapters

pub mod stripe;
pub mod unconfigured;

pub use stripe::StripePaymentGateway;
pub use unconfigured::UnconfiguredPaymentGateway;
