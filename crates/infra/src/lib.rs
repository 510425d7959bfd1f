//! # CareSlot Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite record store and payment ledger (r2d2 pool)
//! - Calendar and payment gateway REST adapters
//! - Configuration loading and tracing bootstrap
//! - [`AppContext`], which wires all of the above from a [`careslot_domain::Config`]
//!
//! ## Architecture
//! - Implements traits defined in `careslot-core`
//! - Contains all "impure" code (I/O, network)

pub mod config;
pub mod context;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;

// Re-export commonly used items
pub use context::AppContext;
pub use database::*;
pub use errors::InfraError;
pub use http::*;
pub use integrations::*;
