//! Configuration loading
//!
//! Reads [`careslot_domain::Config`] from environment variables or a JSON /
//! TOML file.

pub mod loader;

pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
