//! Tenable.sc Common - Shared utilities: logging, configuration, crypto helpers
//!
//! This crate provides common functionality used across the provider crates.

pub mod config;
pub mod crypto;
pub mod logging;

pub use config::{Config, ConfigBuilder, LoggingConfig, ProviderConfig};
pub use logging::{init_logging, init_logging_with_config, LogConfig, LogFormat};
