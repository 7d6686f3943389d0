//! Error types for the Tenable.sc provider

use thiserror::Error;

/// Result type alias using the provider Error
pub type Result<T> = std::result::Result<T, Error>;

/// Provider error types
#[derive(Error, Debug)]
pub enum Error {
    // === Validation Errors (raised before any network call) ===
    #[error("invalid value for {attribute}: {message}")]
    Validation { attribute: String, message: String },

    #[error("no such permission: {0}")]
    NoSuchPermission(String),

    #[error("unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("unknown data source type: {0}")]
    UnknownDataSourceType(String),

    // === Upstream Errors ===
    #[error("{kind} {id} not found")]
    NotFound { kind: String, id: String },

    /// Any other upstream failure; the text is kept verbatim for the operator.
    #[error("{0}")]
    Upstream(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing required configuration: {key}")]
    MissingConfig { key: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Build a validation error attributed to a configuration attribute
    pub fn validation(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Whether upstream reported the entity as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Whether the error was raised before contacting upstream
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::Validation { .. } | Error::NoSuchPermission(_) | Error::Parse(_)
        )
    }

    /// The configuration attribute this error concerns, when known
    pub fn attribute(&self) -> Option<&str> {
        match self {
            Error::Validation { attribute, .. } => Some(attribute.as_str()),
            Error::MissingConfig { key } | Error::InvalidConfig { key, .. } => Some(key.as_str()),
            _ => None,
        }
    }

    /// Get an error code for logging
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "VALIDATION",
            Error::NoSuchPermission(_) => "NO_SUCH_PERMISSION",
            Error::UnknownResourceType(_) => "UNKNOWN_RESOURCE",
            Error::UnknownDataSourceType(_) => "UNKNOWN_DATA_SOURCE",
            Error::NotFound { .. } => "NOT_FOUND",
            Error::Upstream(_) => "UPSTREAM_ERROR",
            Error::Configuration(_) => "CONFIG_ERROR",
            Error::MissingConfig { .. } => "MISSING_CONFIG",
            Error::InvalidConfig { .. } => "INVALID_CONFIG",
            Error::Io(_) => "IO_ERROR",
            Error::FileNotFound { .. } => "FILE_NOT_FOUND",
            Error::Json(_) => "JSON_ERROR",
            Error::Parse(_) => "PARSE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_names_attribute() {
        let err = Error::validation("protocol", "invalid protocol 'sctp'");
        assert_eq!(err.attribute(), Some("protocol"));
        assert!(err.is_validation());
        assert!(err.to_string().contains("sctp"));
    }

    #[test]
    fn test_not_found_classification() {
        let err = Error::NotFound {
            kind: "role".into(),
            id: "12".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(!Error::Upstream("boom".into()).is_not_found());
    }

    #[test]
    fn test_upstream_text_is_verbatim() {
        let err = Error::Upstream("API error (403): Invalid login credentials".into());
        assert_eq!(err.to_string(), "API error (403): Invalid login credentials");
    }
}
