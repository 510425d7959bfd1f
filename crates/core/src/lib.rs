//! # CareSlot Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The appointment dual-write synchronizer (calendar first, record store
//!   second)
//! - Event mapping lookups and the appointment query engine
//! - Payment confirmation
//! - Port/adapter interfaces (traits)
//!
//! ## Architecture Principles
//! - Only depends on `careslot-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod appointments;
pub mod payments;

pub use appointments::input::{CreateAppointmentInput, UpdateAppointmentInput};
pub use appointments::ports::{AppointmentRepository, CalendarProvider};
pub use appointments::{AppointmentQueryService, AppointmentSynchronizer, EventMapping};
pub use payments::ports::{PaymentGateway, PaymentRepository};
pub use payments::PaymentService;
