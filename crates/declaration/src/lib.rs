//! Configuration declaration registry.
//!
//! This crate lets a host application and its plugins declare, document,
//! validate and export configuration options before their values reach the
//! runtime configuration store. A `Declaration` is filled from the built-in
//! core schema and from plugins, sealed, and then used read-only.

pub mod declaration;
pub mod describe;
mod error;
pub mod format;
pub mod key;
pub mod load;
pub mod option;
pub mod payload;
pub mod plugin;
pub mod validation;

pub use declaration::{Declaration, Item, SAFE_MODE_KEY, STRICT_MODE_KEY};
pub use describe::{Describe, Describer};
pub use error::DeclarationError;
pub use format::FormatRegistry;
pub use key::{Key, KeyError, Pattern};
pub use load::{DefaultCallable, DefaultCallables, LoadInput};
pub use option::{ConfigOption, DefaultValue, Flags, Validator};
pub use payload::{PAYLOAD_VERSION, Payload};
pub use plugin::{DeclareConfigOptions, Plugin, PluginRegistry, PluginSet};
pub use validation::{ConfigMap, ErrorMap, Schema, StandardEngine, ValidationEngine, as_bool};
