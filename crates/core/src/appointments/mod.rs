//! Appointment synchronization across the calendar provider and the record
//! store

pub mod input;
pub mod mapping;
pub mod ports;
pub mod query;
pub mod synchronizer;

pub use mapping::EventMapping;
pub use query::AppointmentQueryService;
pub use synchronizer::AppointmentSynchronizer;
