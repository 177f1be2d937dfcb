//! Named default factories referenced by `default_callable` in payloads.

use std::collections::HashMap;

use rand::RngExt;
use serde_json::{Map, Value};

/// Computes a default from the payload's `default_args`.
pub type DefaultCallable = fn(&Map<String, Value>) -> Result<Value, String>;

/// Table of default factories available to the `dict` loader.
#[derive(Debug, Clone)]
pub struct DefaultCallables {
    table: HashMap<String, DefaultCallable>,
}

impl Default for DefaultCallables {
    fn default() -> Self {
        let mut callables = Self {
            table: HashMap::new(),
        };
        callables
            .register("secrets.token_hex", token_hex)
            .register("env.get", env_get);
        callables
    }
}

impl DefaultCallables {
    pub fn register(&mut self, name: impl Into<String>, callable: DefaultCallable) -> &mut Self {
        self.table.insert(name.into(), callable);
        self
    }

    pub fn get(&self, name: &str) -> Option<DefaultCallable> {
        self.table.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }
}

/// Random hex token. Args: `nbytes` (default 32).
fn token_hex(args: &Map<String, Value>) -> Result<Value, String> {
    let nbytes = match args.get("nbytes") {
        None => 32,
        Some(value) => value
            .as_u64()
            .filter(|n| (1..=1024).contains(n))
            .ok_or_else(|| format!("nbytes must be an integer between 1 and 1024, got {value}"))?
            as usize,
    };
    let mut bytes = vec![0u8; nbytes];
    rand::rng().fill(&mut bytes[..]);
    Ok(Value::String(hex::encode(bytes)))
}

/// Environment variable lookup. Args: `name` (required), `fallback` (optional).
fn env_get(args: &Map<String, Value>) -> Result<Value, String> {
    let name = args
        .get("name")
        .and_then(Value::as_str)
        .ok_or("missing string argument 'name'")?;
    match std::env::var(name) {
        Ok(value) => Ok(Value::String(value)),
        Err(_) => Ok(args.get("fallback").cloned().unwrap_or(Value::Null)),
    }
}
