//! Logging setup on top of `tracing-subscriber`
//!
//! Everything goes to stderr; stdout carries the provider's JSON results.

use tenablesc_core::{Error, Result};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// HTTP stack crates kept at `warn` unless `RUST_LOG` says otherwise
const QUIET_DEPENDENCIES: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls", "h2"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    /// One JSON object per line
    Json,
    #[default]
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            other => Err(Error::InvalidConfig {
                key: "logging.format".into(),
                message: format!("unknown format '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level for the provider's own crates (default: warn)
    pub level: String,
    pub format: LogFormat,
    /// Include file and line of the emitting call
    pub with_source_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: String::from("warn"),
            format: LogFormat::Compact,
            with_source_location: false,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_source_location(mut self) -> Self {
        self.with_source_location = true;
        self
    }

    /// Build from the `[logging]` config section; an unknown format falls back to compact
    pub fn from_config(config: &crate::config::LoggingConfig) -> Self {
        Self::new()
            .level(config.level.clone())
            .format(config.format.parse().unwrap_or_default())
    }

    /// Filter directives: the configured level, with the HTTP stack held at `warn`
    pub fn directives(&self) -> String {
        let mut directives = vec![self.level.clone()];
        directives.extend(QUIET_DEPENDENCIES.iter().map(|krate| format!("{}=warn", krate)));
        directives.join(",")
    }

    fn filter(&self) -> Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(self.directives()).map_err(|e| Error::InvalidConfig {
            key: "logging.level".into(),
            message: e.to_string(),
        })
    }

    fn layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let base = fmt::layer()
            .with_writer(std::io::stderr)
            .with_file(self.with_source_location)
            .with_line_number(self.with_source_location);
        match self.format {
            LogFormat::Json => base.json().boxed(),
            LogFormat::Compact => base.compact().boxed(),
            LogFormat::Pretty => base.pretty().boxed(),
        }
    }
}

/// Install the global subscriber with default settings
pub fn init_logging() -> Result<()> {
    init_logging_with_config(LogConfig::default())
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `config.level` when set. Fails if the level does
/// not parse or a subscriber is already installed.
pub fn init_logging_with_config(config: LogConfig) -> Result<()> {
    let filter = config.filter()?;
    tracing_subscriber::registry()
        .with(config.layer())
        .with(filter)
        .try_init()
        .map_err(|e| Error::Configuration(format!("cannot install log subscriber: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        let err = "xml".parse::<LogFormat>().unwrap_err();
        assert_eq!(err.code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_unknown_format_in_config_falls_back() {
        let section = crate::config::LoggingConfig {
            level: "debug".into(),
            format: "bogus".into(),
        };
        let config = LogConfig::from_config(&section);
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Compact);
    }

    #[test]
    fn test_directives_quiet_http_stack() {
        let directives = LogConfig::new().level("trace").directives();
        assert!(directives.starts_with("trace,"));
        assert!(directives.contains("reqwest=warn"));
        assert!(directives.contains("hyper=warn"));
    }
}
