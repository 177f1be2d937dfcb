//! CLI command implementations.

pub mod declaration;
pub mod describe;
pub mod search;
pub mod undeclared;
pub mod validate;

use anyhow::{Context, Result};
use confdecl_declaration::{ConfigMap, Declaration};

use crate::live::enabled_plugins;
use crate::plugins;

/// Explicit plugin names, followed by the enabled ones when requested. Duplicates are dropped.
pub(crate) fn selected_plugins(explicit: &[String], enabled: bool, live: &ConfigMap) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let from_live = if enabled { enabled_plugins(live) } else { Vec::new() };
    for name in explicit.iter().cloned().chain(from_live) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Sealed declaration of the core schema (when `core`) and the named plugins, in order.
pub(crate) fn build_declaration(core: bool, plugin_names: &[String]) -> Result<Declaration> {
    let available = plugins::available();
    let mut declaration = Declaration::new();
    if core {
        declaration
            .load_core_declaration()
            .context("Failed to load core declaration")?;
    }
    for name in plugin_names {
        declaration
            .load_plugin(name, &available)
            .with_context(|| format!("Failed to load declaration of plugin '{name}'"))?;
    }
    declaration.seal();
    Ok(declaration)
}

/// Print `output`, terminating it with a newline when it lacks one.
pub(crate) fn emit(output: &str) {
    if output.is_empty() || output.ends_with('\n') {
        print!("{output}");
    } else {
        println!("{output}");
    }
}
