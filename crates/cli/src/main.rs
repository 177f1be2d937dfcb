//! confdecl - inspect, export and validate configuration declarations.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Build declarations from the core schema and bundled plugins.
//! - Print descriptions, templates, search results and validation reports.
//!
//! Does NOT handle:
//! - Declaring, loading or describing options (see `crates/declaration`).
//!
//! Invariants:
//! - Command output goes to stdout; logs and errors go to stderr.

mod args;
mod commands;
mod dispatch;
mod error;
mod live;
mod plugins;

use args::Cli;
use clap::Parser;
use dispatch::run_command;
use error::{ExitCode, ExitCodeExt};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = match run_command(cli) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("{:#}", e);
            e.exit_code()
        }
    };

    std::process::exit(exit_code.as_i32());
}
