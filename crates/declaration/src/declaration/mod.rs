//! The declaration registry.
//!
//! Responsibilities:
//! - Own declared options and the order of keys and annotations.
//! - Enforce the one-way seal: after `seal`, nothing can be declared or annotated.
//! - Coordinate `setup` against a live configuration map (safe backfill, strict validation).
//! - Expose query, validation and export operations.
//!
//! Does NOT handle:
//! - Running validators (delegated to a `ValidationEngine`).
//! - Plugin discovery (consumed through `PluginRegistry`).
//!
//! Invariants:
//! - Every key in `mapping` appears exactly once in `order`, and vice versa.
//! - Mutable access to options is only handed out while unsealed.
//! - Failed operations leave `mapping` and `order` untouched.

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::describe::{self, Codec, StructuredDescriber};
use crate::error::DeclarationError;
use crate::key::{Key, KeyError, Pattern};
use crate::load::{self, DefaultCallables, LoadInput};
use crate::option::{ConfigOption, DefaultValue, Flags, Validator};
use crate::payload::Payload;
use crate::plugin::PluginRegistry;
use crate::validation::{ConfigMap, ErrorMap, Schema, ValidationEngine, as_bool};

/// Live key that turns on default backfill during `setup`.
pub const SAFE_MODE_KEY: &str = "config.safe";

/// Live key that turns on validation during `setup`.
pub const STRICT_MODE_KEY: &str = "config.strict";

/// An entry of the declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Key(Key),
    Annotation(String),
}

/// Ordered, sealable registry of configuration options.
#[derive(Debug, Clone, Default)]
pub struct Declaration {
    mapping: IndexMap<Key, ConfigOption>,
    order: Vec<Item>,
    plugins: IndexSet<String>,
    core_loaded: bool,
    sealed: bool,
    callables: DefaultCallables,
}

impl Declaration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every declaration and unseal. Registered default callables are kept.
    pub fn reset(&mut self) {
        self.mapping.clear();
        self.order.clear();
        self.plugins.clear();
        self.core_loaded = false;
        self.sealed = false;
    }

    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn is_core_loaded(&self) -> bool {
        self.core_loaded
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<&ConfigOption> {
        self.mapping.get(key)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.mapping.contains_key(key)
    }

    /// Keys and annotations in declaration order.
    pub fn items(&self) -> &[Item] {
        &self.order
    }

    /// Options in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &ConfigOption)> {
        self.mapping.iter()
    }

    /// Names of plugins already merged in.
    pub fn plugins(&self) -> impl Iterator<Item = &str> {
        self.plugins.iter().map(String::as_str)
    }

    pub fn callables(&self) -> &DefaultCallables {
        &self.callables
    }

    pub fn callables_mut(&mut self) -> &mut DefaultCallables {
        &mut self.callables
    }

    fn ensure_unsealed(
        &self,
        action: &'static str,
        target: impl FnOnce() -> String,
    ) -> Result<(), DeclarationError> {
        if self.sealed {
            return Err(DeclarationError::Sealed {
                action,
                target: target(),
            });
        }
        Ok(())
    }

    /// Declare a new option and return it for further configuration.
    pub fn declare(
        &mut self,
        key: Key,
        default: impl Into<DefaultValue>,
    ) -> Result<&mut ConfigOption, DeclarationError> {
        self.ensure_unsealed("declare", || key.to_string())?;
        if self.mapping.contains_key(&key) {
            return Err(DeclarationError::AlreadyDeclared(key));
        }
        self.order.push(Item::Key(key.clone()));
        let entry = self.mapping.entry(key).or_insert(ConfigOption::new(default.into()));
        Ok(entry)
    }

    /// Declare a boolean option. The default is coerced; a missing default becomes `false`.
    pub fn declare_bool(
        &mut self,
        key: Key,
        default: impl Into<DefaultValue>,
    ) -> Result<&mut ConfigOption, DeclarationError> {
        let flag = match default.into() {
            DefaultValue::Unset => false,
            DefaultValue::Value(value) => as_bool(&value),
        };
        let option = self.declare(key, flag)?;
        option.set_validators("boolean_validator");
        Ok(option)
    }

    pub fn declare_int(
        &mut self,
        key: Key,
        default: impl Into<DefaultValue>,
    ) -> Result<&mut ConfigOption, DeclarationError> {
        let option = self.declare(key, default)?;
        option.set_validators("convert_int");
        Ok(option)
    }

    /// Start a new section.
    pub fn annotate(&mut self, annotation: impl Into<String>) -> Result<(), DeclarationError> {
        let annotation = annotation.into();
        self.ensure_unsealed("annotate", || annotation.clone())?;
        self.order.push(Item::Annotation(annotation));
        Ok(())
    }

    /// Keys matching `pattern` whose flags do not intersect `exclude`.
    ///
    /// The iterator is lazy and can be cloned to restart it.
    pub fn iter_options(
        &self,
        pattern: &str,
        exclude: Flags,
    ) -> Result<impl Iterator<Item = &Key> + Clone + '_, KeyError> {
        let pattern = Pattern::parse(pattern)?;
        Ok(self
            .mapping
            .iter()
            .filter(move |(key, option)| !option.has_flag(exclude) && pattern.matches(key))
            .map(|(key, _)| key))
    }

    /// Every key that is neither ignored nor experimental.
    pub fn iter_default_options(&self) -> impl Iterator<Item = &Key> + Clone + '_ {
        self.mapping
            .iter()
            .filter(|(_, option)| !option.has_flag(Flags::NOT_ITERABLE))
            .map(|(key, _)| key)
    }

    /// Rebuild the declaration from the core schema and every capable plugin, seal it,
    /// then apply the modes requested by `live`.
    ///
    /// Plugins declare in reverse registration order. With `config.safe` set, missing
    /// live keys are backfilled from declared defaults (`no_default` options excepted).
    /// With `config.strict` set, any validation issue fails the whole setup.
    pub fn setup(
        &mut self,
        live: &mut ConfigMap,
        plugins: &dyn PluginRegistry,
        engine: &dyn ValidationEngine,
    ) -> Result<(), DeclarationError> {
        self.reset();
        self.load_core_declaration()?;
        for (name, _) in plugins.config_declarers().into_iter().rev() {
            self.load_plugin(name, plugins)?;
        }
        self.seal();
        tracing::debug!(options = self.len(), plugins = self.plugins.len(), "Declaration sealed");

        if live.get(SAFE_MODE_KEY).is_some_and(as_bool) {
            self.backfill(live);
        }

        if live.get(STRICT_MODE_KEY).is_some_and(as_bool) {
            let errors = self.validate(live, engine);
            if !errors.is_empty() {
                let report = errors
                    .iter()
                    .map(|(key, issues)| format!("{key}: {}", issues.join("; ")))
                    .collect::<Vec<_>>()
                    .join("\n");
                return Err(DeclarationError::InvalidConfiguration { report });
            }
        }
        Ok(())
    }

    /// Insert the declared default of every missing live key, skipping `no_default` options.
    pub fn backfill(&self, live: &mut ConfigMap) {
        let candidates = self
            .mapping
            .iter()
            .filter(|(_, option)| !option.has_flag(Flags::NO_DEFAULT));
        for (key, option) in candidates {
            let name = key.to_string();
            if live.contains_key(&name) {
                continue;
            }
            if let DefaultValue::Value(value) = option.default_value() {
                tracing::debug!(key = %name, "Backfilled from declared default");
                live.insert(name, value.clone());
            }
        }
    }

    /// Validate a copy of `live` and return the issues per key.
    pub fn validate(&self, live: &ConfigMap, engine: &dyn ValidationEngine) -> ErrorMap {
        let data = live.clone();
        let (_, errors) = engine.validate(&data, &self.into_schema());
        errors
    }

    /// Validator chains for every declared key. Options without validators get an
    /// empty chain; other options with a default start with `default(<json>)`.
    pub fn into_schema(&self) -> Schema {
        let mut schema = Schema::new();
        for (key, option) in &self.mapping {
            let mut chain = Vec::with_capacity(option.validators().len() + 1);
            if option.validators().is_empty() {
                schema.insert(key.to_string(), chain);
                continue;
            }
            if let DefaultValue::Value(value) = option.default_value() {
                chain.push(Validator::with_arg("default", value.to_string()));
            }
            chain.extend(option.validators().iter().cloned());
            schema.insert(key.to_string(), chain);
        }
        schema
    }

    /// Ini text of every option that is not internal, ignored or experimental.
    pub fn into_ini(&self) -> Result<String, DeclarationError> {
        self.describe_with("ini", Flags::NOT_DESCRIBED)
    }

    pub fn describe(&self, format: &str) -> Result<String, DeclarationError> {
        self.describe_with(format, Flags::NOT_DESCRIBED)
    }

    pub fn describe_with(&self, format: &str, exclude: Flags) -> Result<String, DeclarationError> {
        describe::describe(self, format, exclude)
    }

    /// Structured payload, suitable for `load_dict`.
    pub fn describe_payload(&self, exclude: Flags) -> Payload {
        let mut describer = StructuredDescriber::new(Codec::Dict);
        describe::walk(self, &mut describer, exclude);
        describer.into_payload()
    }

    /// Merge the built-in schema. A second call is a no-op.
    pub fn load_core_declaration(&mut self) -> Result<(), DeclarationError> {
        if self.core_loaded {
            tracing::debug!("Core declaration already loaded");
            return Ok(());
        }
        load::load(self, "core", LoadInput::Core)?;
        self.core_loaded = true;
        Ok(())
    }

    /// Merge the options of plugin `name`. A second call with the same name is a no-op.
    pub fn load_plugin(
        &mut self,
        name: &str,
        registry: &dyn PluginRegistry,
    ) -> Result<(), DeclarationError> {
        if self.plugins.contains(name) {
            tracing::debug!(plugin = name, "Plugin declaration already loaded");
            return Ok(());
        }
        load::load(self, "plugin", LoadInput::Plugin { name, registry })?;
        self.plugins.insert(name.to_string());
        Ok(())
    }

    /// Merge a structured payload. Fails without side effects on any problem.
    pub fn load_dict(&mut self, payload: &Value) -> Result<(), DeclarationError> {
        load::load(self, "dict", LoadInput::Dict(payload))
    }
}

#[cfg(test)]
mod tests;
