//! Command-line inspection of the node registry
//!
//! Builds the same runtime the editor uses and answers catalog queries as
//! pretty-printed JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use node_registry::config::defaults;
use node_registry::{CatalogRuntime, NodeConfig, PortValues, RegistryConfig, RegistryError};
use serde::Serialize;
use serde_json::json;

/// CLI errors
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("Invalid JSON for {arg}: {source}")]
    InvalidJson {
        arg: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write output: {0}")]
    Output(#[from] serde_json::Error),
}

type Result<T> = std::result::Result<T, CliError>;

/// Inspect node types, the node catalog and plugins; run and export nodes
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the registry configuration (defaults to $NODE_REGISTRY_CONFIG,
    /// then ./registry.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured schema version (e.g. v0.1.0)
    #[arg(short, long)]
    schema_version: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered port types with their ancestors
    Types,
    /// List the catalog grouped by category
    List {
        /// Only show this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one catalog entry
    Show { id: String },
    /// Check whether an output port may feed an input port
    Check {
        source_node: String,
        source_port: String,
        target_node: String,
        target_port: String,
    },
    /// Check a JSON value against a port type
    Validate { type_id: String, value: String },
    /// Execute a node
    Run {
        id: String,
        /// Input values as a JSON object
        #[arg(long, default_value = "{}")]
        inputs: String,
        /// Config values as a JSON object
        #[arg(long, default_value = "{}")]
        config: String,
    },
    /// Print the code fragment for a node
    Codegen {
        id: String,
        /// Config values as a JSON object
        #[arg(long, default_value = "{}")]
        config: String,
    },
    /// Report discovered and rejected plugins
    Plugins,
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config
        .clone()
        .or_else(|| std::env::var_os(defaults::CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(defaults::CONFIG_FILE))
}

fn parse_object(arg: &'static str, raw: &str) -> Result<PortValues> {
    serde_json::from_str(raw).map_err(|source| CliError::InvalidJson { arg, source })
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn execute(runtime: &CatalogRuntime, command: Command) -> Result<()> {
    match command {
        Command::Types => {
            let types = runtime.types();
            let listing: Vec<_> = types
                .definitions()
                .map(|def| {
                    json!({
                        "id": def.id,
                        "name": def.name,
                        "introduced_in": def.introduced_in,
                        "ancestors": types.ancestors(&def.id),
                    })
                })
                .collect();
            print_json(&listing)
        }
        Command::List { category } => {
            let categories = runtime.catalog().by_category();
            match category {
                Some(name) => print_json(&json!({ name.as_str(): categories.get(&name) })),
                None => print_json(categories),
            }
        }
        Command::Show { id } => print_json(runtime.catalog().require(&id)?),
        Command::Check {
            source_node,
            source_port,
            target_node,
            target_port,
        } => {
            let compatible = runtime.catalog().can_connect(
                runtime.types(),
                &source_node,
                &source_port,
                &target_node,
                &target_port,
            )?;
            print_json(&json!({ "compatible": compatible }))
        }
        Command::Validate { type_id, value } => {
            let value: serde_json::Value = serde_json::from_str(&value)
                .map_err(|source| CliError::InvalidJson { arg: "value", source })?;
            runtime.types().validate_value(&type_id, &value)?;
            print_json(&json!({ "valid": true }))
        }
        Command::Run { id, inputs, config } => {
            let inputs = parse_object("--inputs", &inputs)?;
            let config: NodeConfig = parse_object("--config", &config)?;
            let outputs = runtime.dispatcher().execute(&id, &inputs, &config)?;
            print_json(&outputs)
        }
        Command::Codegen { id, config } => {
            let config: NodeConfig = parse_object("--config", &config)?;
            println!("{}", runtime.dispatcher().generate_code(&id, &config)?);
            Ok(())
        }
        Command::Plugins => {
            let plugins = runtime.plugins();
            print_json(&json!({
                "plugins": plugins.definitions(),
                "rejected": plugins.rejected(),
            }))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = RegistryConfig::load(&config_path(&cli))?;
    if let Some(version) = cli.schema_version {
        config.schema_version = version;
    }

    let runtime = builtin_nodes::initialize(&config)?;
    execute(&runtime, cli.command)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "node-registry",
            "check",
            "core.text.length",
            "result",
            "core.math.add",
            "a",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Check { ref target_port, .. } if target_port == "a"));
    }

    #[test]
    fn test_parse_run_defaults() {
        let cli = Cli::try_parse_from(["node-registry", "-s", "v0.1.0", "run", "core.math.add"]).unwrap();
        assert_eq!(cli.schema_version.as_deref(), Some("v0.1.0"));
        match cli.command {
            Command::Run { id, inputs, config } => {
                assert_eq!(id, "core.math.add");
                assert_eq!(inputs, "{}");
                assert_eq!(config, "{}");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_explicit_config_path_wins() {
        let cli = Cli::try_parse_from(["node-registry", "--config", "custom.json", "types"]).unwrap();
        assert_eq!(config_path(&cli), PathBuf::from("custom.json"));
    }

    #[test]
    fn test_parse_object() {
        let values = parse_object("--inputs", r#"{"a": 4, "b": 0}"#).unwrap();
        assert_eq!(values["a"], json!(4));
        assert!(matches!(
            parse_object("--inputs", "[1, 2]"),
            Err(CliError::InvalidJson { arg: "--inputs", .. })
        ));
    }
}
