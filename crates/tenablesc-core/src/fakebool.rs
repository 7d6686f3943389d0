//! String-encoded booleans as used by the Tenable.sc API

use serde::{Deserialize, Serialize};

const TRUE_TOKEN: &str = "true";
const FALSE_TOKEN: &str = "false";

/// A boolean transmitted as a string token.
///
/// Decoding is total: any token other than `"true"` reads as `false`, since upstream
/// occasionally grows new token variants without notice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FakeBool(String);

impl FakeBool {
    /// Wrap a raw upstream token
    pub fn from_token(token: impl Into<String>) -> Self {
        FakeBool(token.into())
    }

    pub fn as_bool(&self) -> bool {
        self.0 == TRUE_TOKEN
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    /// No token was transmitted at all
    pub fn is_unset(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<bool> for FakeBool {
    fn from(value: bool) -> Self {
        FakeBool(String::from(if value { TRUE_TOKEN } else { FALSE_TOKEN }))
    }
}

impl From<&FakeBool> for bool {
    fn from(value: &FakeBool) -> Self {
        value.as_bool()
    }
}

impl std::fmt::Display for FakeBool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
