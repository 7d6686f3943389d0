//! Configuration management for the Tenable.sc provider

use serde::{Deserialize, Serialize};
use std::path::Path;
use tenablesc_core::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream connection settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Create a configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Merge with environment variables (TENABLESC_ prefix)
    pub fn merge_env(self) -> Self {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    /// Merge from an arbitrary variable source
    pub fn merge_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        // Connection
        if let Some(val) = var("TENABLESC_URI") {
            self.provider.uri = val;
        }
        if let Some(val) = var("TENABLESC_ACCESS_KEY") {
            self.provider.access_key = Some(val);
        }
        if let Some(val) = var("TENABLESC_SECRET_KEY") {
            self.provider.secret_key = Some(val);
        }
        if let Some(val) = var("TENABLESC_REQUEST_TIMEOUT") {
            if let Ok(n) = val.parse() {
                self.provider.request_timeout_seconds = n;
            }
        }
        if let Some(val) = var("TENABLESC_INSECURE_SKIP_VERIFY") {
            if let Ok(b) = val.parse() {
                self.provider.insecure_skip_verify = b;
            }
        }

        // Logging
        if let Some(val) = var("TENABLESC_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = var("TENABLESC_LOG_FORMAT") {
            self.logging.format = val;
        }

        self
    }

    /// Check that everything needed to reach upstream is present
    pub fn validate(&self) -> Result<()> {
        if self.provider.uri.trim().is_empty() {
            return Err(Error::MissingConfig {
                key: "provider.uri".into(),
            });
        }
        if !self.provider.uri.starts_with("http://") && !self.provider.uri.starts_with("https://")
        {
            return Err(Error::InvalidConfig {
                key: "provider.uri".into(),
                message: format!("'{}' is not an http(s) URL", self.provider.uri),
            });
        }
        if self.provider.access_key.as_deref().unwrap_or("").is_empty() {
            return Err(Error::MissingConfig {
                key: "provider.access_key".into(),
            });
        }
        if self.provider.secret_key.as_deref().unwrap_or("").is_empty() {
            return Err(Error::MissingConfig {
                key: "provider.secret_key".into(),
            });
        }
        match self.logging.format.as_str() {
            "pretty" | "json" | "compact" => Ok(()),
            other => Err(Error::InvalidConfig {
                key: "logging.format".into(),
                message: format!("unknown format '{}'", other),
            }),
        }
    }
}

/// Upstream connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URI of the Tenable.sc instance, e.g. `https://sc.example.com`
    #[serde(default)]
    pub uri: String,

    /// API access key
    pub access_key: Option<String>,

    /// API secret key
    pub secret_key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Skip server certificate verification (NOT recommended for production)
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            access_key: None,
            secret_key: None,
            request_timeout_seconds: 60,
            insecure_skip_verify: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    String::from("warn")
}

fn default_log_format() -> String {
    String::from("compact")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Builder for constructing Config
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.config.provider.uri = uri.into();
        self
    }

    pub fn access_key(mut self, key: impl Into<String>) -> Self {
        self.config.provider.access_key = Some(key.into());
        self
    }

    pub fn secret_key(mut self, key: impl Into<String>) -> Self {
        self.config.provider.secret_key = Some(key.into());
        self
    }

    pub fn request_timeout(mut self, seconds: u64) -> Self {
        self.config.provider.request_timeout_seconds = seconds;
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
