//! Declaration command implementation.

use anyhow::{Context, Result};
use confdecl_declaration::ConfigMap;

use super::{build_declaration, emit, selected_plugins};

pub fn run(plugins: &[String], core: bool, enabled: bool, live: &ConfigMap) -> Result<()> {
    let names = selected_plugins(plugins, enabled, live);
    let declaration = build_declaration(core, &names)?;
    let ini = declaration
        .into_ini()
        .context("Failed to render config template")?;
    emit(&ini);
    Ok(())
}
