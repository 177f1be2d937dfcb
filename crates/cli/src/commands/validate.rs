//! Validate command implementation.
//!
//! Declares the core schema and the enabled plugins the same way the host does at
//! startup, so `config.safe` backfills defaults and `config.strict` fails the command.

use anyhow::{Context, Result};
use confdecl_declaration::{ConfigMap, Declaration, ErrorMap, StandardEngine};
use tracing::info;

use crate::live::enabled_plugins;
use crate::plugins;

pub fn run(live: &ConfigMap) -> Result<()> {
    let errors = check(live.clone())?;
    if errors.is_empty() {
        info!("Configuration is valid");
    }
    for (key, issues) in &errors {
        println!("{key}: {}", issues.join("; "));
    }
    Ok(())
}

fn check(mut live: ConfigMap) -> Result<ErrorMap> {
    let names = enabled_plugins(&live);
    let enabled = plugins::select(names.iter().map(String::as_str));
    let engine = StandardEngine::new();

    let mut declaration = Declaration::new();
    declaration
        .setup(&mut live, &enabled, &engine)
        .context("Configuration rejected in strict mode")?;
    Ok(declaration.validate(&live, &engine))
}
