//! Describe command implementation.

use anyhow::{Context, Result};
use confdecl_declaration::ConfigMap;
use confdecl_declaration::describe::describers;
use tracing::info;

use super::{build_declaration, emit, selected_plugins};

pub fn run(
    plugins: &[String],
    core: bool,
    enabled: bool,
    format: &str,
    live: &ConfigMap,
) -> Result<()> {
    describers().get(format)?;

    let names = selected_plugins(plugins, enabled, live);
    let declaration = build_declaration(core, &names)?;
    if declaration.items().is_empty() {
        info!("Nothing selected to describe");
        return Ok(());
    }

    let output = declaration
        .describe(format)
        .with_context(|| format!("Failed to describe declaration as {format}"))?;
    emit(&output);
    Ok(())
}
