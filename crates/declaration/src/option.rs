//! Declared option model.
//!
//! Responsibilities:
//! - Hold the default value, validators, description and flags of one declared option.
//! - Provide chainable setters used at declaration call sites.
//! - Parse and render validator lists (`"not_empty convert_int"`).
//!
//! Does NOT handle:
//! - Enforcing the seal (the registry only hands out `&mut ConfigOption` while unsealed).
//! - Running validators (see `validation`).

use std::fmt;

use serde_json::Value;

bitflags::bitflags! {
    /// Visibility and behaviour flags of a declared option.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flags: u8 {
        /// Declared but commented out in generated ini files.
        const DISABLED = 1 << 0;
        /// Hidden from enumeration and descriptions.
        const IGNORED = 1 << 1;
        /// Used by the application itself, not meant for operators.
        const INTERNAL = 1 << 2;
        /// Not stable yet; hidden from casual enumeration.
        const EXPERIMENTAL = 1 << 3;
        /// Never backfilled from its default in safe mode.
        const NO_DEFAULT = 1 << 4;
        /// Documents that operators should set this option explicitly. Descriptive only:
        /// validation and safe-mode backfill do not read it.
        const REQUIRED = 1 << 5;
    }
}

impl Flags {
    /// Default exclusion for `Declaration::iter_options`.
    pub const NOT_ITERABLE: Flags = Flags::IGNORED.union(Flags::EXPERIMENTAL);

    /// Default exclusion for describers.
    pub const NOT_DESCRIBED: Flags = Flags::INTERNAL
        .union(Flags::IGNORED)
        .union(Flags::EXPERIMENTAL);

    /// Payload field name of every flag, in a stable order.
    pub const FIELDS: [(&'static str, Flags); 6] = [
        ("disabled", Flags::DISABLED),
        ("ignored", Flags::IGNORED),
        ("internal", Flags::INTERNAL),
        ("experimental", Flags::EXPERIMENTAL),
        ("no_default", Flags::NO_DEFAULT),
        ("required", Flags::REQUIRED),
    ];

    /// True if any bit of `mask` is set.
    pub fn has_any(self, mask: Flags) -> bool {
        self.intersects(mask)
    }
}

/// Default of an option. `Unset` differs from a `null`, `false` or empty default.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DefaultValue {
    #[default]
    Unset,
    Value(Value),
}

impl DefaultValue {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            DefaultValue::Unset => None,
            DefaultValue::Value(value) => Some(value),
        }
    }

    pub fn is_set(&self) -> bool {
        matches!(self, DefaultValue::Value(_))
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        DefaultValue::Value(value)
    }
}

impl From<Option<Value>> for DefaultValue {
    fn from(value: Option<Value>) -> Self {
        value.map_or(DefaultValue::Unset, DefaultValue::Value)
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        DefaultValue::Value(Value::from(value))
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        DefaultValue::Value(Value::from(value))
    }
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        DefaultValue::Value(Value::from(value))
    }
}

impl From<i32> for DefaultValue {
    fn from(value: i32) -> Self {
        DefaultValue::Value(Value::from(value))
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        DefaultValue::Value(Value::from(value))
    }
}

impl From<u64> for DefaultValue {
    fn from(value: u64) -> Self {
        DefaultValue::Value(Value::from(value))
    }
}

/// A named validator reference, optionally carrying a raw argument: `name` or `name(arg)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Validator {
    name: String,
    arg: Option<String>,
}

impl Validator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg: None,
        }
    }

    pub fn with_arg(name: impl Into<String>, arg: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arg: Some(arg.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw argument text between the parentheses.
    pub fn arg(&self) -> Option<&str> {
        self.arg.as_deref()
    }

    /// Split a space-separated validator list. Whitespace inside parentheses,
    /// brackets, braces or quotes belongs to the argument.
    pub fn parse_list(text: &str) -> Vec<Validator> {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut depth = 0usize;
        let mut quoted = false;
        let mut escaped = false;

        for c in text.chars() {
            if quoted {
                current.push(c);
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => quoted = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => {
                    quoted = true;
                    current.push(c);
                }
                '(' | '[' | '{' => {
                    depth += 1;
                    current.push(c);
                }
                ')' | ']' | '}' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                c if c.is_whitespace() && depth == 0 => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                }
                c => current.push(c),
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }

        tokens.iter().map(|token| Validator::from_token(token)).collect()
    }

    fn from_token(token: &str) -> Validator {
        match token.split_once('(') {
            Some((name, rest)) if rest.ends_with(')') => {
                Validator::with_arg(name, &rest[..rest.len() - 1])
            }
            _ => Validator::new(token),
        }
    }

    /// Render a list the way `parse_list` reads it.
    pub fn join(validators: &[Validator]) -> String {
        validators
            .iter()
            .map(Validator::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.arg {
            Some(arg) => write!(f, "{}({})", self.name, arg),
            None => f.write_str(&self.name),
        }
    }
}

/// One declared configuration entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOption {
    default: DefaultValue,
    validators: Vec<Validator>,
    flags: Flags,
    description: Option<String>,
}

impl ConfigOption {
    pub fn new(default: DefaultValue) -> Self {
        Self {
            default,
            ..Self::default()
        }
    }

    pub fn default_value(&self) -> &DefaultValue {
        &self.default
    }

    pub fn has_default(&self) -> bool {
        self.default.is_set()
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn has_flag(&self, mask: Flags) -> bool {
        self.flags.has_any(mask)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_default(&mut self, value: impl Into<DefaultValue>) -> &mut Self {
        self.default = value.into();
        self
    }

    /// Replace the validator list.
    pub fn set_validators(&mut self, validators: &str) -> &mut Self {
        self.validators = Validator::parse_list(validators);
        self
    }

    /// Extend the validator list.
    pub fn append_validators(&mut self, validators: &str) -> &mut Self {
        self.validators.extend(Validator::parse_list(validators));
        self
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn set_flag(&mut self, flag: Flags) -> &mut Self {
        self.flags |= flag;
        self
    }

    pub fn disable(&mut self) -> &mut Self {
        self.set_flag(Flags::DISABLED)
    }

    pub fn ignore(&mut self) -> &mut Self {
        self.set_flag(Flags::IGNORED)
    }

    pub fn internal(&mut self) -> &mut Self {
        self.set_flag(Flags::INTERNAL)
    }

    pub fn experimental(&mut self) -> &mut Self {
        self.set_flag(Flags::EXPERIMENTAL)
    }

    pub fn no_default(&mut self) -> &mut Self {
        self.set_flag(Flags::NO_DEFAULT)
    }

    /// Mark as required in descriptions; attach `not_missing` to enforce it.
    pub fn required(&mut self) -> &mut Self {
        self.set_flag(Flags::REQUIRED)
    }

    /// Default rendered for an ini file: booleans lowercase, lists space-joined,
    /// unset and `null` as empty text.
    pub fn str_value(&self) -> String {
        match self.default.as_value() {
            None | Some(Value::Null) => String::new(),
            Some(value) => ini_text(value),
        }
    }
}

fn ini_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(ini_text).collect::<Vec<_>>().join(" "),
        other => other.to_string(),
    }
}
