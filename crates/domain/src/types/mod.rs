//! Domain types and models

pub mod appointment;
pub mod calendar;
pub mod payment;
pub mod stats;

pub use appointment::{
    Appointment, AppointmentFilter, AppointmentOrder, AppointmentPatch, AppointmentStatus,
    NewAppointment,
};
pub use calendar::{CalendarEventData, CreatedEvent, EventMetadata, EventPatch, EventPayload};
pub use payment::{NewPayment, PaymentIntent, PaymentRecord, PaymentStatus};
pub use stats::{AppointmentStats, ServiceState, ServiceStatus};
