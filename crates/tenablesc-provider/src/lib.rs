//! Tenable.sc Provider - declarative management of Tenable.sc configuration
//!
//! This crate provides:
//! - `Schema`: attribute declarations with defaults, validation and planning
//! - `Resource` / `DataSource`: per-kind mappings between attributes and upstream records
//! - Twelve managed resource kinds and seven read-only data sources
//! - `Provider`: the registry and lifecycle entry points (validate, plan, apply, import)
//! - Shared helpers for permissions, scan policy preferences and value normalization

pub mod data_sources;
pub mod descriptions;
pub mod normalize;
pub mod permissions;
pub mod preferences;
pub mod provider;
pub mod recovery;
pub mod resource;
pub mod resources;
pub mod schema;
pub mod validate;

pub use provider::{OperationResult, Provider, ResourceState};
pub use resource::{DataSource, Resource};
pub use schema::{AttrType, Attribute, AttributeChange, Plan, Schema};
