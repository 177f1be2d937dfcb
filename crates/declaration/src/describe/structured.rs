//! Structured describers sharing one payload builder.

use crate::error::DeclarationError;
use crate::key::Key;
use crate::option::{ConfigOption, Validator};
use crate::payload::{Group, OptionEntry, Payload};

use super::Describe;

/// Serialization applied to the accumulated payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// Pretty-printed JSON.
    Dict,
    Json,
    Toml,
    Yaml,
}

/// Accumulates `{version, groups}`; the codec only matters in `finalize`.
#[derive(Debug)]
pub struct StructuredDescriber {
    payload: Payload,
    codec: Codec,
}

impl StructuredDescriber {
    pub fn new(codec: Codec) -> Self {
        Self {
            payload: Payload::new(),
            codec,
        }
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    fn current_group(&mut self) -> &mut Group {
        if self.payload.groups.is_empty() {
            self.payload.groups.push(Group::default());
        }
        let last = self.payload.groups.len() - 1;
        &mut self.payload.groups[last]
    }
}

impl Describe for StructuredDescriber {
    fn annotate(&mut self, annotation: &str) {
        self.payload.groups.push(Group {
            annotation: Some(annotation.to_string()),
            options: Vec::new(),
        });
    }

    fn add_option(&mut self, key: &Key, option: &ConfigOption) {
        let mut entry = OptionEntry {
            key: key.to_string(),
            default: option.default_value().as_value().cloned(),
            description: option.description().map(str::to_string),
            ..OptionEntry::default()
        };
        if !option.validators().is_empty() {
            entry.validators = Some(Validator::join(option.validators()));
        }
        entry.set_flags(option.flags());
        self.current_group().options.push(entry);
    }

    fn finalize(self) -> Result<String, DeclarationError> {
        let text = match self.codec {
            Codec::Dict => serde_json::to_string_pretty(&self.payload)?,
            Codec::Json => serde_json::to_string(&self.payload)?,
            Codec::Toml => toml::to_string(&self.payload)?,
            Codec::Yaml => serde_yaml::to_string(&self.payload)?,
        };
        Ok(text)
    }
}
