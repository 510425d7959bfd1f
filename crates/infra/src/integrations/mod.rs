//! External service integrations

pub mod calendar;
pub mod payments;

pub use calendar::{GoogleCalendarProvider, UnconfiguredCalendarProvider};
pub use payments::{StripePaymentGateway, UnconfiguredPaymentGateway};
