//! Validation engine contract.
//!
//! Responsibilities:
//! - Define the shapes exchanged with a validation engine (`ConfigMap`, `Schema`, `ErrorMap`).
//! - Define the `ValidationEngine` trait the registry delegates to.
//! - Provide `StandardEngine`, a named-validator engine covering the built-in validators.
//!
//! Does NOT handle:
//! - Building schemas from declarations (see `Declaration::into_schema`).
//!
//! Invariants:
//! - Engines never mutate their input map; validated data is returned as a new map.
//! - Error maps only contain keys with at least one issue.

mod standard;

pub use standard::{StandardEngine, Step, ValidatorFn};

use indexmap::IndexMap;
use serde_json::Value;

use crate::option::Validator;

/// Live configuration: flat dotted keys to heterogeneous values.
pub type ConfigMap = IndexMap<String, Value>;

/// Validator chains by stringified key.
pub type Schema = IndexMap<String, Vec<Validator>>;

/// Human-readable issues by stringified key.
pub type ErrorMap = IndexMap<String, Vec<String>>;

/// Converts raw configuration into validated data plus an error map.
///
/// Schemas built by `Declaration::into_schema` carry every declared key; a key with
/// an empty chain has no constraints.
pub trait ValidationEngine {
    fn validate(&self, data: &ConfigMap, schema: &Schema) -> (ConfigMap, ErrorMap);
}

/// Lenient truthiness used for mode switches such as `config.safe`.
///
/// Strings `true`, `yes`, `on`, `y`, `t` and `1` (any case) are true; numbers are
/// true when non-zero; everything else is false.
pub fn as_bool(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "on" | "y" | "t" | "1"
        ),
        _ => false,
    }
}
