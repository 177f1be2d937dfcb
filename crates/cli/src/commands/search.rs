//! Search command implementation.

use anyhow::{Context, Result};
use confdecl_declaration::{ConfigMap, Flags};

use super::{build_declaration, selected_plugins};

pub fn run(pattern: &str, include_plugin: &[String], live: &ConfigMap) -> Result<()> {
    let names = selected_plugins(include_plugin, true, live);
    let declaration = build_declaration(true, &names)?;

    let keys = declaration
        .iter_options(pattern, Flags::NOT_ITERABLE)
        .with_context(|| format!("Invalid search pattern '{pattern}'"))?;
    for key in keys {
        println!("{key}");
    }
    Ok(())
}
