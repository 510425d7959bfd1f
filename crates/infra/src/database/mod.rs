//! Database implementations

pub mod appointment_repository;
pub mod manager;
pub mod payment_repository;

pub use appointment_repository::SqliteAppointmentRepository;
pub use manager::{DbConnection, DbManager};
pub use payment_repository::SqlitePaymentRepository;
