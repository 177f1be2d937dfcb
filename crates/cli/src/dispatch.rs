//! Command dispatch logic.
//!
//! Responsibilities:
//! - Route parsed CLI arguments to appropriate command handlers.
//! - Load the live configuration once and hand it to every command.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - Reading or flattening config files (see `live` module).
//!
//! Invariants:
//! - Commands are routed based on the top-level Commands enum variant.

use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::commands;
use crate::live;

/// Dispatch CLI commands to their respective handlers.
pub(crate) fn run_command(cli: Cli) -> Result<()> {
    let live = live::load(cli.config.as_deref(), &cli.overrides)?;

    match cli.command {
        Commands::Describe {
            plugins,
            core,
            enabled,
            format,
        } => {
            commands::describe::run(&plugins, core, enabled, &format, &live)?;
        }
        Commands::Declaration {
            plugins,
            core,
            enabled,
        } => {
            commands::declaration::run(&plugins, core, enabled, &live)?;
        }
        Commands::Search {
            pattern,
            include_plugin,
        } => {
            commands::search::run(&pattern, &include_plugin, &live)?;
        }
        Commands::Undeclared { include_plugin } => {
            commands::undeclared::run(&include_plugin, &live)?;
        }
        Commands::Validate => {
            commands::validate::run(&live)?;
        }
    }

    Ok(())
}
