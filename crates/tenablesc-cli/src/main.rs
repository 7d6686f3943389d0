//! Tenable.sc CLI - drive the provider from the command line
//!
//! Reads configuration attributes and prior state as JSON files, runs one lifecycle
//! operation, and prints the resulting state and diagnostics as JSON on stdout.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tenablesc_client::InMemoryClient;
use tenablesc_common::logging::{init_logging_with_config, LogConfig};
use tenablesc_common::Config;
use tenablesc_core::AttrMap;
use tenablesc_provider::{OperationResult, Provider, ResourceState};
use tracing::{debug, info};

/// Tenable.sc provider driver
#[derive(Parser, Debug)]
#[command(name = "tenablesc")]
#[command(version)]
#[command(about = "Manage Tenable.sc configuration declaratively", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "tenablesc.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, json, compact); overrides the config file
    #[arg(long)]
    log_format: Option<String>,

    /// Use an empty in-memory backend instead of a Tenable.sc instance
    #[arg(long)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the provider schema, or the schema of one resource or data source
    Schema {
        /// Resource or data source type name
        type_name: Option<String>,
    },
    /// Check a configuration without contacting upstream
    Validate {
        type_name: String,
        /// JSON file with the configured attributes
        attributes: PathBuf,
    },
    /// Show the changes applying a configuration would make
    Plan {
        type_name: String,
        attributes: PathBuf,
        /// JSON file with the current state
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Create, update or replace an entity to match a configuration
    Apply {
        type_name: String,
        attributes: PathBuf,
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Refresh a state file from upstream
    Read { type_name: String, state: PathBuf },
    /// Adopt an existing upstream entity by id
    Import { type_name: String, id: String },
    /// Delete the entity recorded in a state file
    Delete { type_name: String, state: PathBuf },
    /// Run a data source lookup
    Query {
        type_name: String,
        /// JSON file with the lookup arguments
        attributes: Option<PathBuf>,
    },
}

impl Command {
    fn needs_upstream(&self) -> bool {
        !matches!(
            self,
            Command::Schema { .. } | Command::Validate { .. } | Command::Plan { .. }
        )
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let settings = if args.config.exists() {
        Config::from_file(&args.config)?
    } else {
        Config::default()
    };
    let mut settings = settings.merge_env();
    if let Some(level) = args.log_level {
        settings.logging.level = level;
    }
    if let Some(format) = args.log_format {
        settings.logging.format = format;
    }
    init_logging_with_config(LogConfig::from_config(&settings.logging))?;
    debug!(version = env!("CARGO_PKG_VERSION"), "tenablesc starting");

    let mut provider = if args.offline {
        info!("using in-memory backend");
        Provider::with_client(Arc::new(InMemoryClient::new()))
    } else {
        Provider::new()
    };
    if !args.offline && args.command.needs_upstream() {
        provider
            .connect(&settings)
            .await
            .context("failed to connect to Tenable.sc")?;
    }

    let ok = match args.command {
        Command::Schema { type_name } => {
            let schema = match type_name.as_deref() {
                None => provider.schema(),
                Some(name) => provider
                    .resource_schema(name)
                    .or_else(|_| provider.data_source_schema(name))?,
            };
            print_json(schema)?;
            true
        }
        Command::Validate {
            type_name,
            attributes,
        } => {
            let diags = provider.validate_resource(&type_name, &read_json(&attributes)?);
            print_json(&diags)?;
            !diags.has_error()
        }
        Command::Plan {
            type_name,
            attributes,
            state,
        } => {
            let prior = read_state(state.as_deref())?;
            let plan =
                provider.plan_resource(&type_name, prior.as_ref(), &read_json(&attributes)?)?;
            print_json(&plan)?;
            true
        }
        Command::Apply {
            type_name,
            attributes,
            state,
        } => {
            let attributes: AttrMap = read_json(&attributes)?;
            let diags = provider.validate_resource(&type_name, &attributes);
            if diags.has_error() {
                report(&OperationResult {
                    state: None,
                    diagnostics: diags,
                })?
            } else {
                let prior = read_state(state.as_deref())?;
                let plan = provider.plan_resource(&type_name, prior.as_ref(), &attributes)?;
                let outcome = match prior {
                    Some(prior) if !plan.has_changes() => provider.read(&type_name, prior).await,
                    Some(prior) => provider.update(&type_name, prior, plan.planned).await,
                    None => provider.create(&type_name, plan.planned).await,
                };
                report(&outcome)?
            }
        }
        Command::Read { type_name, state } => {
            let state: ResourceState = read_json(&state)?;
            report(&provider.read(&type_name, state).await)?
        }
        Command::Import { type_name, id } => report(&provider.import(&type_name, &id).await)?,
        Command::Delete { type_name, state } => {
            let state: ResourceState = read_json(&state)?;
            report(&provider.delete(&type_name, state).await)?
        }
        Command::Query {
            type_name,
            attributes,
        } => {
            let attributes = match attributes {
                Some(path) => read_json(&path)?,
                None => AttrMap::new(),
            };
            report(&provider.read_data_source(&type_name, &attributes).await)?
        }
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn read_state(path: Option<&Path>) -> Result<Option<ResourceState>> {
    path.map(read_json).transpose()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an operation outcome; true when it carried no errors
fn report(outcome: &OperationResult) -> Result<bool> {
    print_json(outcome)?;
    Ok(!outcome.diagnostics.has_error())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let args = Args::try_parse_from([
            "tenablesc",
            "--offline",
            "apply",
            "tenablesc_scan_zone",
            "zone.json",
            "--state",
            "zone.state.json",
        ])
        .unwrap();
        assert!(args.offline);
        assert!(args.command.needs_upstream());
        match args.command {
            Command::Apply { type_name, state, .. } => {
                assert_eq!(type_name, "tenablesc_scan_zone");
                assert_eq!(state, Some(PathBuf::from("zone.state.json")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_plan_runs_without_upstream() {
        let args = Args::try_parse_from(["tenablesc", "plan", "tenablesc_role", "role.json"]).unwrap();
        assert!(!args.command.needs_upstream());
    }

    #[test]
    fn test_read_state_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"id": "7", "attributes": {{"name": "dmz"}}}}"#).unwrap();

        let state = read_state(Some(file.path())).unwrap().unwrap();
        assert_eq!(state.id, "7");
        assert!(read_state(None).unwrap().is_none());
    }

    #[test]
    fn test_read_json_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = read_json::<AttrMap>(file.path()).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }
}
