//! Shared test helpers for `careslot-core` integration tests.
//!
//! In-memory fakes for every port. Each fake can be told to fail a named
//! operation so tests can drive the partial-failure paths.

#![allow(dead_code)]

pub mod calendar;
pub mod payments;
pub mod repositories;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use careslot_domain::{AdapterError, AdapterResult};

/// Per-operation failure injection shared by the fakes.
#[derive(Default, Clone)]
pub struct Failures {
    inner: Arc<Mutex<HashMap<&'static str, AdapterError>>>,
}

impl Failures {
    /// Make every call to `operation` fail with `error` until cleared.
    pub fn set(&self, operation: &'static str, error: AdapterError) {
        self.inner.lock().unwrap().insert(operation, error);
    }

    pub fn clear(&self, operation: &'static str) {
        self.inner.lock().unwrap().remove(operation);
    }

    pub fn check(&self, operation: &'static str) -> AdapterResult<()> {
        match self.inner.lock().unwrap().get(operation) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Valid booking request used across tests.
pub fn booking(date: &str, time: &str) -> careslot_core::CreateAppointmentInput {
    careslot_core::CreateAppointmentInput {
        patient_name: Some("Ada Lovelace".into()),
        patient_email: Some("ada@example.com".into()),
        patient_phone: Some("+33 6 12 34 56 78".into()),
        date: Some(date.into()),
        time: Some(time.into()),
        appointment_type: Some("checkup".into()),
        notes: None,
    }
}
