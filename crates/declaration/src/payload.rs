//! Structured declaration payload (`{version, groups: [{annotation, options}]}`).
//!
//! Responsibilities:
//! - Define the typed payload shared by the `dict` loader and the structured describers.
//! - Check an untyped payload and report every shape problem at once.
//!
//! Does NOT handle:
//! - Checks that need a registry (duplicate keys, seal state, default callables);
//!   see `load`.
//!
//! Invariants:
//! - Only version 1 is accepted; any other version fails with `UnsupportedVersion`.
//! - Shape errors are collected across the whole payload before returning.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::DeclarationError;
use crate::key::Key;
use crate::option::Flags;

pub const PAYLOAD_VERSION: u64 = 1;

/// Declaration helper used to register an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Base,
    Bool,
    Int,
}

impl OptionKind {
    fn parse(text: &str) -> Option<Self> {
        match text {
            "base" => Some(OptionKind::Base),
            "bool" => Some(OptionKind::Bool),
            "int" => Some(OptionKind::Int),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    pub version: u64,
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Group {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    pub options: Vec<OptionEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OptionEntry {
    pub key: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<OptionKind>,
    /// `None` when the option has no default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validators: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub disabled: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub ignored: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub internal: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub experimental: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub no_default: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_callable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_args: Option<Map<String, Value>>,
}

fn is_false(flag: &bool) -> bool {
    !flag
}

impl OptionEntry {
    pub fn flags(&self) -> Flags {
        let mut flags = Flags::empty();
        for (field, flag) in Flags::FIELDS {
            if self.flag_field(field) {
                flags |= flag;
            }
        }
        flags
    }

    pub fn set_flags(&mut self, flags: Flags) {
        self.disabled = flags.contains(Flags::DISABLED);
        self.ignored = flags.contains(Flags::IGNORED);
        self.internal = flags.contains(Flags::INTERNAL);
        self.experimental = flags.contains(Flags::EXPERIMENTAL);
        self.no_default = flags.contains(Flags::NO_DEFAULT);
        self.required = flags.contains(Flags::REQUIRED);
    }

    fn flag_field(&self, field: &str) -> bool {
        match field {
            "disabled" => self.disabled,
            "ignored" => self.ignored,
            "internal" => self.internal,
            "experimental" => self.experimental,
            "no_default" => self.no_default,
            "required" => self.required,
            _ => false,
        }
    }

    fn flag_field_mut(&mut self, field: &str) -> Option<&mut bool> {
        match field {
            "disabled" => Some(&mut self.disabled),
            "ignored" => Some(&mut self.ignored),
            "internal" => Some(&mut self.internal),
            "experimental" => Some(&mut self.experimental),
            "no_default" => Some(&mut self.no_default),
            "required" => Some(&mut self.required),
            _ => None,
        }
    }
}

impl Payload {
    pub fn new() -> Self {
        Self {
            version: PAYLOAD_VERSION,
            groups: Vec::new(),
        }
    }

    /// Check an untyped payload and convert it.
    pub fn from_value(data: &Value) -> Result<Self, DeclarationError> {
        let Some(root) = data.as_object() else {
            return Err(DeclarationError::InvalidPayload {
                errors: vec!["payload: Must be a mapping".to_string()],
            });
        };
        match root.get("version") {
            None => {
                return Err(DeclarationError::InvalidPayload {
                    errors: vec!["version: Missing value".to_string()],
                });
            }
            Some(version) if version.as_u64() == Some(PAYLOAD_VERSION) => {}
            Some(other) => return Err(DeclarationError::UnsupportedVersion(other.clone())),
        }

        let mut checker = Checker::default();
        let groups = match root.get("groups") {
            Some(Value::Array(groups)) => groups
                .iter()
                .enumerate()
                .filter_map(|(index, group)| checker.group(&format!("groups[{index}]"), group))
                .collect(),
            Some(_) => {
                checker.fail("groups", "Must be a list");
                Vec::new()
            }
            None => {
                checker.fail("groups", "Missing value");
                Vec::new()
            }
        };

        checker.finish(Payload {
            version: PAYLOAD_VERSION,
            groups,
        })
    }

    pub fn option_count(&self) -> usize {
        self.groups.iter().map(|group| group.options.len()).sum()
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct Checker {
    errors: Vec<String>,
}

impl Checker {
    fn fail(&mut self, path: &str, message: impl std::fmt::Display) {
        self.errors.push(format!("{path}: {message}"));
    }

    fn finish<T>(self, value: T) -> Result<T, DeclarationError> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(DeclarationError::InvalidPayload {
                errors: self.errors,
            })
        }
    }

    fn group(&mut self, path: &str, data: &Value) -> Option<Group> {
        let Some(object) = data.as_object() else {
            self.fail(path, "Must be a mapping");
            return None;
        };
        let annotation = self.string(object, path, "annotation");
        let options = match object.get("options") {
            Some(Value::Array(options)) => options
                .iter()
                .enumerate()
                .filter_map(|(index, option)| {
                    self.option(&format!("{path}.options[{index}]"), option)
                })
                .collect(),
            Some(_) => {
                self.fail(&format!("{path}.options"), "Must be a list");
                Vec::new()
            }
            None => {
                self.fail(&format!("{path}.options"), "Missing value");
                Vec::new()
            }
        };
        Some(Group {
            annotation,
            options,
        })
    }

    fn option(&mut self, path: &str, data: &Value) -> Option<OptionEntry> {
        let Some(object) = data.as_object() else {
            self.fail(path, "Must be a mapping");
            return None;
        };

        let mut entry = OptionEntry::default();
        match object.get("key") {
            Some(Value::String(key)) => match Key::parse(key) {
                Ok(_) => entry.key = key.clone(),
                Err(err) => self.fail(&format!("{path}.key"), err),
            },
            Some(_) => self.fail(&format!("{path}.key"), "Must be a string"),
            None => self.fail(&format!("{path}.key"), "Missing value"),
        }

        entry.kind = match object.get("type") {
            None | Some(Value::Null) => None,
            Some(Value::String(kind)) if OptionKind::parse(kind).is_some() => OptionKind::parse(kind),
            Some(_) => {
                self.fail(&format!("{path}.type"), "Must be one of: base, bool, int");
                None
            }
        };

        entry.default = object.get("default").cloned();
        entry.validators = match object.get("validators") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            Some(_) => {
                self.fail(&format!("{path}.validators"), "Must be a string");
                None
            }
        };
        entry.description = self.string(object, path, "description");
        entry.default_callable = self.string(object, path, "default_callable");
        entry.default_args = match object.get("default_args") {
            None | Some(Value::Null) => None,
            Some(Value::Object(args)) => Some(args.clone()),
            Some(_) => {
                self.fail(&format!("{path}.default_args"), "Must be a mapping");
                None
            }
        };

        for (field, _) in Flags::FIELDS {
            match object.get(field) {
                None | Some(Value::Null) => {}
                Some(Value::Bool(value)) => {
                    if let Some(slot) = entry.flag_field_mut(field) {
                        *slot = *value;
                    }
                }
                Some(_) => self.fail(&format!("{path}.{field}"), "Must be a boolean"),
            }
        }

        Some(entry)
    }

    fn string(&mut self, object: &Map<String, Value>, path: &str, field: &str) -> Option<String> {
        match object.get(field) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(_) => {
                self.fail(&format!("{path}.{field}"), "Must be a string");
                None
            }
        }
    }
}
