//! Upstream identifiers
//!
//! Tenable.sc sends object IDs sometimes as JSON strings and sometimes as numbers.
//! At the boundary they are always opaque strings; numeric conversion is explicit.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// An identifier that is probably a string on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProbablyString(String);

impl ProbablyString {
    pub fn new(id: impl Into<String>) -> Self {
        ProbablyString(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for ProbablyString {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Int(i64),
            UInt(u64),
            Null,
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Str(s) => ProbablyString(s),
            Raw::Int(n) => ProbablyString(n.to_string()),
            Raw::UInt(n) => ProbablyString(n.to_string()),
            Raw::Null => ProbablyString(String::new()),
        })
    }
}

impl From<&str> for ProbablyString {
    fn from(s: &str) -> Self {
        ProbablyString(s.to_string())
    }
}

impl From<String> for ProbablyString {
    fn from(s: String) -> Self {
        ProbablyString(s)
    }
}

impl std::fmt::Display for ProbablyString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Convert an identifier that must be numeric.
///
/// Fails on anything that is not a 32-bit integer instead of truncating.
pub fn parse_numeric_id(attribute: &str, id: &str) -> Result<i64> {
    id.trim()
        .parse::<i32>()
        .map(i64::from)
        .map_err(|_| Error::validation(attribute, format!("'{}' is not a numeric identifier", id)))
}
