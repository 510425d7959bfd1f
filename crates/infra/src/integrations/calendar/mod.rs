//! Calendar provider adapters

pub mod google;
pub mod unconfigured;

pub use google::GoogleCalendarProvider;
pub use unconfigured::UnconfiguredCalendarProvider;
