//! Live configuration for command execution.
//!
//! Responsibilities:
//! - Read the live configuration file (TOML, JSON or YAML, chosen by extension).
//! - Flatten nested tables into dotted keys.
//! - Apply `--set KEY=VALUE` overrides.
//!
//! Does NOT handle:
//! - Validating values (see `commands::validate`).
//!
//! Invariants:
//! - Without a file and without overrides the live map is empty.
//! - Overrides always win over file entries and are stored as strings.

use std::path::Path;

use anyhow::{Context, Result, bail};
use confdecl_declaration::ConfigMap;
use serde_json::Value;

/// Live key listing the enabled plugins.
pub const PLUGINS_KEY: &str = "ckan.plugins";

pub(crate) fn load(path: Option<&Path>, overrides: &[(String, String)]) -> Result<ConfigMap> {
    let mut live = ConfigMap::new();
    if let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) {
        let data = read_file(path)?;
        flatten(None, data, &mut live);
        tracing::debug!(path = %path.display(), entries = live.len(), "Loaded live configuration");
    }
    for (key, value) in overrides {
        live.insert(key.clone(), Value::String(value.clone()));
    }
    Ok(live)
}

fn read_file(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let data: Value = match extension.as_str() {
        "toml" => toml::from_str(&text)
            .with_context(|| format!("Failed to parse TOML config {}", path.display()))?,
        "json" => serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON config {}", path.display()))?,
        "yaml" | "yml" => serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse YAML config {}", path.display()))?,
        other => bail!(
            "Unsupported config file extension '{}' for {}. Valid options: toml, json, yaml, yml",
            other,
            path.display()
        ),
    };
    match data {
        Value::Object(_) => Ok(data),
        Value::Null => Ok(Value::Object(Default::default())),
        _ => bail!("Config file {} must contain a table", path.display()),
    }
}

fn flatten(prefix: Option<&str>, value: Value, live: &mut ConfigMap) {
    match value {
        Value::Object(table) => {
            for (key, child) in table {
                let path = match prefix {
                    Some(prefix) => format!("{prefix}.{key}"),
                    None => key,
                };
                flatten(Some(&path), child, live);
            }
        }
        leaf => {
            if let Some(prefix) = prefix {
                live.insert(prefix.to_string(), leaf);
            }
        }
    }
}

/// Plugin names listed under `ckan.plugins` (space separated text or a list).
pub(crate) fn enabled_plugins(live: &ConfigMap) -> Vec<String> {
    match live.get(PLUGINS_KEY) {
        Some(Value::String(text)) => text.split_whitespace().map(str::to_string).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
