//! Named-validator engine.
//!
//! Each schema entry is a chain of validators run left to right over the field
//! value. A chain ends at the first `Step::Stop` or `Step::Invalid`; the field
//! value left after the chain is written to the validated map.

use std::collections::HashMap;

use serde_json::Value;

use super::{ConfigMap, ErrorMap, Schema, ValidationEngine, as_bool};

const MISSING: &str = "Missing value";
const NOT_INTEGER: &str = "Please enter an integer value";

/// Outcome of a single validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// End the chain without an error.
    Stop,
    Invalid(String),
}

/// A validator: the field value (`None` when the key is missing) and the raw argument.
pub type ValidatorFn = fn(&mut Option<Value>, Option<&str>) -> Step;

/// Validation engine backed by a table of named validators.
#[derive(Debug, Clone)]
pub struct StandardEngine {
    validators: HashMap<String, ValidatorFn>,
}

impl Default for StandardEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardEngine {
    /// Engine with the built-in validators registered.
    pub fn new() -> Self {
        let mut engine = Self::empty();
        engine
            .register("default", default)
            .register("ignore_missing", ignore_missing)
            .register("ignore_empty", ignore_empty)
            .register("not_missing", not_missing)
            .register("not_empty", not_empty)
            .register("unicode_safe", unicode_safe)
            .register("convert_int", convert_int)
            .register("int_validator", int_validator)
            .register("natural_number_validator", natural_number)
            .register("is_positive_integer", positive_integer)
            .register("boolean_validator", boolean)
            .register("as_list", as_list)
            .register("one_of", one_of);
        engine
    }

    pub fn empty() -> Self {
        Self {
            validators: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, validator: ValidatorFn) -> &mut Self {
        self.validators.insert(name.into(), validator);
        self
    }

    pub fn knows(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }
}

impl ValidationEngine for StandardEngine {
    fn validate(&self, data: &ConfigMap, schema: &Schema) -> (ConfigMap, ErrorMap) {
        let mut validated = data.clone();
        let mut errors = ErrorMap::new();

        for (key, chain) in schema {
            let mut field = validated.get(key).cloned();
            for validator in chain {
                let Some(run) = self.validators.get(validator.name()) else {
                    tracing::warn!(key = %key, validator = %validator, "Unknown validator skipped");
                    continue;
                };
                match run(&mut field, validator.arg()) {
                    Step::Continue => {}
                    Step::Stop => break,
                    Step::Invalid(message) => {
                        errors.entry(key.clone()).or_default().push(message);
                        break;
                    }
                }
            }
            match field {
                Some(value) => {
                    validated.insert(key.clone(), value);
                }
                None => {
                    validated.shift_remove(key);
                }
            }
        }

        (validated, errors)
    }
}

fn is_empty(field: &Option<Value>) -> bool {
    match field {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Parse a validator argument as JSON, falling back to plain text.
fn parse_arg(arg: &str) -> Value {
    serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_string()))
}

fn to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|n| n.fract() == 0.0).map(|n| n as i64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn default(field: &mut Option<Value>, arg: Option<&str>) -> Step {
    if field.is_none() {
        *field = Some(arg.map_or(Value::Null, parse_arg));
    }
    Step::Continue
}

fn ignore_missing(field: &mut Option<Value>, _: Option<&str>) -> Step {
    match field {
        None | Some(Value::Null) => Step::Stop,
        Some(_) => Step::Continue,
    }
}

fn ignore_empty(field: &mut Option<Value>, _: Option<&str>) -> Step {
    if is_empty(field) {
        Step::Stop
    } else {
        Step::Continue
    }
}

fn not_missing(field: &mut Option<Value>, _: Option<&str>) -> Step {
    match field {
        None => Step::Invalid(MISSING.to_string()),
        Some(_) => Step::Continue,
    }
}

fn not_empty(field: &mut Option<Value>, _: Option<&str>) -> Step {
    if is_empty(field) {
        Step::Invalid(MISSING.to_string())
    } else {
        Step::Continue
    }
}

fn unicode_safe(field: &mut Option<Value>, _: Option<&str>) -> Step {
    if let Some(value @ (Value::Number(_) | Value::Bool(_))) = field {
        *value = Value::String(value.to_string());
    }
    Step::Continue
}

fn convert_int(field: &mut Option<Value>, _: Option<&str>) -> Step {
    match field.as_ref().and_then(to_integer) {
        Some(number) => {
            *field = Some(Value::from(number));
            Step::Continue
        }
        None => Step::Invalid(NOT_INTEGER.to_string()),
    }
}

fn int_validator(field: &mut Option<Value>, arg: Option<&str>) -> Step {
    if is_empty(field) {
        *field = Some(Value::Null);
        return Step::Continue;
    }
    convert_int(field, arg)
}

fn natural_number(field: &mut Option<Value>, arg: Option<&str>) -> Step {
    match convert_int(field, arg) {
        Step::Continue if field.as_ref().and_then(Value::as_i64).is_some_and(|n| n < 0) => {
            Step::Invalid("Must be a natural number".to_string())
        }
        step => step,
    }
}

fn positive_integer(field: &mut Option<Value>, arg: Option<&str>) -> Step {
    match convert_int(field, arg) {
        Step::Continue if field.as_ref().and_then(Value::as_i64).is_some_and(|n| n < 1) => {
            Step::Invalid("Must be a positive integer".to_string())
        }
        step => step,
    }
}

fn boolean(field: &mut Option<Value>, _: Option<&str>) -> Step {
    let flag = field.as_ref().is_some_and(as_bool);
    *field = Some(Value::Bool(flag));
    Step::Continue
}

fn as_list(field: &mut Option<Value>, _: Option<&str>) -> Step {
    if let Some(Value::String(text)) = field {
        let items = text
            .split_whitespace()
            .map(|item| Value::String(item.to_string()))
            .collect();
        *field = Some(Value::Array(items));
    }
    Step::Continue
}

fn one_of(field: &mut Option<Value>, arg: Option<&str>) -> Step {
    let Some(Value::Array(choices)) = arg.map(parse_arg) else {
        return Step::Invalid("one_of requires a list of choices".to_string());
    };
    let Some(value) = field.as_ref() else {
        return Step::Continue;
    };
    let accepts = |choice: &Value| {
        choice == value || matches!((choice, value), (Value::String(c), other) if *c == other.to_string())
    };
    if choices.iter().any(accepts) {
        Step::Continue
    } else {
        let listed: Vec<String> = choices
            .iter()
            .map(|choice| match choice {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect();
        Step::Invalid(format!("Value must be one of: {}", listed.join(", ")))
    }
}
