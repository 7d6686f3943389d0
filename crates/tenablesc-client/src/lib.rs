//! Tenable.sc Client - REST access to a Tenable.sc instance
//!
//! This crate provides:
//! - `ScClient`: the async seam the provider calls through
//! - `RestApiClient`: reqwest-backed implementation against `{uri}/rest/...`
//! - `InMemoryClient`: in-process implementation for tests and offline runs
//! - Record types for every upstream kind the provider manages

pub mod client;
pub mod memory;
pub mod rest_client;
pub mod types;

pub use client::{ClientError, ScClient};
pub use memory::InMemoryClient;
pub use rest_client::{RestApiClient, RestClientConfig};
pub use types::*;
