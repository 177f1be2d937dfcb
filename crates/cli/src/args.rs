//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and environment variables.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `dispatch` module).
//! - Does not read the live configuration (see `live` module).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "confdecl")]
#[command(about = "Inspect, export and validate configuration declarations", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  confdecl describe --core --format yaml\n  confdecl declaration datapusher\n  confdecl search 'ckan.datastore.*' --include-plugin datastore\n  confdecl --config site.toml undeclared\n  confdecl --config site.toml --set ckan.devserver.port=8080 validate\n"
)]
pub struct Cli {
    /// Live configuration file (TOML, JSON or YAML, chosen by extension).
    #[arg(short, long, global = true, env = "CONFDECL_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override one live configuration entry (KEY=VALUE). Can be repeated.
    #[arg(long = "set", global = true, value_name = "KEY=VALUE", value_parser = parse_override)]
    pub overrides: Vec<(String, String)>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print declared options in a structured format
    Describe {
        /// Plugins to describe, enabled or not
        plugins: Vec<String>,

        /// Include the core declaration
        #[arg(long)]
        core: bool,

        /// Include every plugin listed in `ckan.plugins`
        #[arg(long)]
        enabled: bool,

        /// Output format (dict, json, toml, yaml, rust, ini; python is an alias of rust)
        #[arg(short, long, default_value = "dict")]
        format: String,
    },

    /// Print declared options as an ini config template
    Declaration {
        /// Plugins to include, enabled or not
        plugins: Vec<String>,

        /// Include the core declaration
        #[arg(long)]
        core: bool,

        /// Include every plugin listed in `ckan.plugins`
        #[arg(long)]
        enabled: bool,
    },

    /// List declared keys matching a pattern
    Search {
        /// Key or wildcard pattern (e.g., 'sqlalchemy.*')
        pattern: String,

        /// Also search the declarations of this plugin. Can be repeated.
        #[arg(short, long = "include-plugin", value_name = "PLUGIN")]
        include_plugin: Vec<String>,
    },

    /// List live configuration keys that nothing declares
    Undeclared {
        /// Also consider the declarations of this plugin. Can be repeated.
        #[arg(short, long = "include-plugin", value_name = "PLUGIN")]
        include_plugin: Vec<String>,
    },

    /// Report live configuration values that fail validation
    Validate,
}

/// Parse a `KEY=VALUE` override.
pub fn parse_override(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
