//! Shared HTTP client

pub mod client;

pub use client::{check_response, HttpClient, HttpClientBuilder};
