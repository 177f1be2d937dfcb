//! Population of a declaration from external sources.
//!
//! Responsibilities:
//! - Dispatch by source name: `core` (embedded YAML schema), `dict` (structured payload),
//!   `plugin` (a plugin's declaration hook).
//! - Apply a payload atomically: every problem is reported before anything is declared.
//! - Evaluate `default_callable` entries through the declaration's `DefaultCallables`.
//!
//! Does NOT handle:
//! - Deduplication of core/plugin loads (see `Declaration::load_core_declaration`
//!   and `Declaration::load_plugin`).
//!
//! Invariants:
//! - A missing plugin, or one without the declaration capability, is logged and ignored.
//! - A failed `dict` load leaves the declaration untouched.

mod callables;

pub use callables::{DefaultCallable, DefaultCallables};

use std::collections::HashSet;
use std::sync::OnceLock;

use serde_json::{Map, Value};

use crate::declaration::Declaration;
use crate::error::DeclarationError;
use crate::format::FormatRegistry;
use crate::key::Key;
use crate::option::DefaultValue;
use crate::payload::{OptionKind, Payload};
use crate::plugin::PluginRegistry;

/// Built-in core schema.
pub const CORE_DECLARATION: &str = include_str!("../../resources/config_declaration.yaml");

/// Input handed to a loader.
#[derive(Clone, Copy)]
pub enum LoadInput<'a> {
    Core,
    Plugin {
        name: &'a str,
        registry: &'a dyn PluginRegistry,
    },
    Dict(&'a Value),
}

pub type LoadHandler = fn(&mut Declaration, LoadInput<'_>) -> Result<(), DeclarationError>;

/// Registry of loaders by source name.
pub fn loaders() -> &'static FormatRegistry<LoadHandler> {
    static LOADERS: OnceLock<FormatRegistry<LoadHandler>> = OnceLock::new();
    LOADERS.get_or_init(|| {
        let mut registry: FormatRegistry<LoadHandler> = FormatRegistry::new("load");
        registry
            .register("core", load_core)
            .register("dict", load_dict)
            .register("plugin", load_plugin);
        registry
    })
}

/// Run the loader registered under `format`.
pub fn load(
    declaration: &mut Declaration,
    format: &str,
    input: LoadInput<'_>,
) -> Result<(), DeclarationError> {
    let handler = loaders().get(format)?;
    handler(declaration, input)
}

fn unexpected(format: &str) -> DeclarationError {
    DeclarationError::UnexpectedInput {
        format: format.to_string(),
    }
}

fn load_core(declaration: &mut Declaration, input: LoadInput<'_>) -> Result<(), DeclarationError> {
    let LoadInput::Core = input else {
        return Err(unexpected("core"));
    };
    let data: Value = serde_yaml::from_str(CORE_DECLARATION).map_err(DeclarationError::CoreSchema)?;
    tracing::debug!("Loading core declaration");
    apply_payload(declaration, &data)
}

fn load_dict(declaration: &mut Declaration, input: LoadInput<'_>) -> Result<(), DeclarationError> {
    let LoadInput::Dict(data) = input else {
        return Err(unexpected("dict"));
    };
    apply_payload(declaration, data)
}

fn load_plugin(declaration: &mut Declaration, input: LoadInput<'_>) -> Result<(), DeclarationError> {
    let LoadInput::Plugin { name, registry } = input else {
        return Err(unexpected("plugin"));
    };
    let Some(plugin) = registry.get(name) else {
        tracing::error!(plugin = name, "Plugin does not exist");
        return Ok(());
    };
    let Some(hook) = plugin.config_declarer() else {
        tracing::error!(plugin = name, "Plugin does not declare config options");
        return Ok(());
    };
    tracing::debug!(plugin = name, "Loading plugin declaration");
    hook.declare_config_options(declaration, &Key::root())
}

/// One option ready to be declared.
struct Prepared {
    key: Key,
    kind: OptionKind,
    default: DefaultValue,
    validators: Option<String>,
    flags: crate::option::Flags,
    description: Option<String>,
}

enum Action {
    Annotate(String),
    Declare(Prepared),
}

fn apply_payload(declaration: &mut Declaration, data: &Value) -> Result<(), DeclarationError> {
    if declaration.is_sealed() {
        return Err(DeclarationError::Sealed {
            action: "load",
            target: "dict".to_string(),
        });
    }
    let payload = Payload::from_value(data)?;
    let actions = prepare(declaration, payload)?;

    for action in actions {
        match action {
            Action::Annotate(annotation) => declaration.annotate(annotation)?,
            Action::Declare(prepared) => {
                let option = match prepared.kind {
                    OptionKind::Base => declaration.declare(prepared.key, prepared.default)?,
                    OptionKind::Bool => declaration.declare_bool(prepared.key, prepared.default)?,
                    OptionKind::Int => declaration.declare_int(prepared.key, prepared.default)?,
                };
                if let Some(validators) = &prepared.validators {
                    option.append_validators(validators);
                }
                option.set_flag(prepared.flags);
                if let Some(description) = prepared.description {
                    option.set_description(description);
                }
            }
        }
    }
    Ok(())
}

/// Resolve keys and defaults, collecting every problem that would stop the load midway.
fn prepare(declaration: &Declaration, payload: Payload) -> Result<Vec<Action>, DeclarationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut actions = Vec::with_capacity(payload.option_count() + payload.groups.len());

    for (group_index, group) in payload.groups.into_iter().enumerate() {
        if let Some(annotation) = group.annotation {
            actions.push(Action::Annotate(annotation));
        }
        for (option_index, entry) in group.options.into_iter().enumerate() {
            let path = format!("groups[{group_index}].options[{option_index}]");
            let key = match Key::parse(&entry.key) {
                Ok(key) => key,
                Err(err) => {
                    errors.push(format!("{path}.key: {err}"));
                    continue;
                }
            };
            if declaration.contains(&key) || !seen.insert(key.clone()) {
                errors.push(format!("{path}.key: {key} already declared"));
            }

            let mut default = DefaultValue::from(entry.default.clone());
            if let Some(callable) = &entry.default_callable {
                match declaration.callables().get(callable) {
                    None => errors.push(format!(
                        "{path}.default_callable: Unknown default callable '{callable}'"
                    )),
                    Some(compute) => {
                        let args = entry.default_args.clone().unwrap_or_else(Map::new);
                        match compute(&args) {
                            Ok(value) => default = DefaultValue::Value(value),
                            Err(message) => errors.push(format!(
                                "{path}.default_callable: '{callable}' failed for {key}: {message}"
                            )),
                        }
                    }
                }
            }

            actions.push(Action::Declare(Prepared {
                flags: entry.flags(),
                kind: entry.kind.unwrap_or(OptionKind::Base),
                key,
                default,
                validators: entry.validators,
                description: entry.description,
            }));
        }
    }

    if errors.is_empty() {
        Ok(actions)
    } else {
        Err(DeclarationError::InvalidPayload { errors })
    }
}
