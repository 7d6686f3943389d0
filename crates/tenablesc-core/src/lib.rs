//! Tenable.sc Core - Foundation types and error handling
//!
//! This crate provides the core abstractions shared by the provider crates:
//! - `ResourceData` / `AttrValue`: the configuration boundary
//! - `Diagnostic`: problems reported back to the configuration engine
//! - `FakeBool`, `ProbablyString`: upstream wire conventions
//! - `IpSet`: canonical IP sets parsed from Tenable's list format

pub mod data;
pub mod diag;
pub mod error;
pub mod fakebool;
pub mod id;
pub mod ipset;
pub mod value;

// Re-export commonly used types at crate root
pub use data::ResourceData;
pub use diag::{AttributePath, DiagSeverity, Diagnostic, Diagnostics, PathStep};
pub use error::{Error, Result};
pub use fakebool::FakeBool;
pub use id::{parse_numeric_id, ProbablyString};
pub use ipset::{IpRange, IpSet, IpSetBuilder};
pub use value::{AttrMap, AttrValue};
