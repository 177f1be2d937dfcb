//! Undeclared command implementation.

use anyhow::Result;
use confdecl_declaration::{ConfigMap, Key};

use super::{build_declaration, selected_plugins};

pub fn run(include_plugin: &[String], live: &ConfigMap) -> Result<()> {
    let names = selected_plugins(include_plugin, true, live);
    let declaration = build_declaration(true, &names)?;

    for name in undeclared_keys(&declaration, live) {
        println!("{name}");
    }
    Ok(())
}

fn undeclared_keys<'a>(
    declaration: &confdecl_declaration::Declaration,
    live: &'a ConfigMap,
) -> Vec<&'a str> {
    live.keys()
        .filter(|name| {
            Key::parse(name)
                .map(|key| !declaration.contains(&key))
                .unwrap_or(true)
        })
        .map(String::as_str)
        .collect()
}
