//! Rendering of a declaration into output formats.
//!
//! Responsibilities:
//! - Walk `Declaration` items in declaration order, honouring an exclusion mask.
//! - Dispatch to a describer chosen by format name (`dict`, `toml`, `json`, `yaml`, `rust`, `ini`).
//!   `python` is accepted as an alias of `rust`.
//!
//! Does NOT handle:
//! - Reading declarations back (see `load`).
//!
//! Invariants:
//! - Annotations are always forwarded, even when every option below them is excluded.
//! - A describer sees each non-excluded option exactly once, in `order`.

mod code;
mod ini;
mod structured;

pub use code::CodeDescriber;
pub use ini::IniDescriber;
pub use structured::{Codec, StructuredDescriber};

use std::sync::OnceLock;

use crate::declaration::{Declaration, Item};
use crate::error::DeclarationError;
use crate::format::FormatRegistry;
use crate::key::Key;
use crate::option::{ConfigOption, Flags};

/// Visitor over a declaration's items.
pub trait Describe {
    fn annotate(&mut self, annotation: &str);
    fn add_option(&mut self, key: &Key, option: &ConfigOption);
    fn finalize(self) -> Result<String, DeclarationError>;
}

/// The available describers.
#[derive(Debug)]
pub enum Describer {
    Structured(StructuredDescriber),
    Code(CodeDescriber),
    Ini(IniDescriber),
}

impl Describe for Describer {
    fn annotate(&mut self, annotation: &str) {
        match self {
            Describer::Structured(inner) => inner.annotate(annotation),
            Describer::Code(inner) => inner.annotate(annotation),
            Describer::Ini(inner) => inner.annotate(annotation),
        }
    }

    fn add_option(&mut self, key: &Key, option: &ConfigOption) {
        match self {
            Describer::Structured(inner) => inner.add_option(key, option),
            Describer::Code(inner) => inner.add_option(key, option),
            Describer::Ini(inner) => inner.add_option(key, option),
        }
    }

    fn finalize(self) -> Result<String, DeclarationError> {
        match self {
            Describer::Structured(inner) => inner.finalize(),
            Describer::Code(inner) => inner.finalize(),
            Describer::Ini(inner) => inner.finalize(),
        }
    }
}

pub type DescriberFactory = fn() -> Describer;

/// Registry of describers by format name.
pub fn describers() -> &'static FormatRegistry<DescriberFactory> {
    static DESCRIBERS: OnceLock<FormatRegistry<DescriberFactory>> = OnceLock::new();
    DESCRIBERS.get_or_init(|| {
        let mut registry: FormatRegistry<DescriberFactory> = FormatRegistry::new("describe");
        registry
            .register("dict", || {
                Describer::Structured(StructuredDescriber::new(Codec::Dict))
            })
            .register("toml", || {
                Describer::Structured(StructuredDescriber::new(Codec::Toml))
            })
            .register("json", || {
                Describer::Structured(StructuredDescriber::new(Codec::Json))
            })
            .register("yaml", || {
                Describer::Structured(StructuredDescriber::new(Codec::Yaml))
            })
            .register("rust", || Describer::Code(CodeDescriber::default()))
            .register("ini", || Describer::Ini(IniDescriber::default()))
            // Legacy tag of the code-generating format.
            .register("python", || Describer::Code(CodeDescriber::default()));
        registry
    })
}

/// Feed every non-excluded item of `declaration` to `describer`.
pub fn walk<D: Describe>(declaration: &Declaration, describer: &mut D, exclude: Flags) {
    for item in declaration.items() {
        match item {
            Item::Annotation(annotation) => describer.annotate(annotation),
            Item::Key(key) => {
                let Some(option) = declaration.get(key) else {
                    tracing::warn!(key = %key, "Ordered key has no option");
                    continue;
                };
                if option.has_flag(exclude) {
                    continue;
                }
                describer.add_option(key, option);
            }
        }
    }
}

/// Describe `declaration` in the named format.
pub fn describe(
    declaration: &Declaration,
    format: &str,
    exclude: Flags,
) -> Result<String, DeclarationError> {
    let factory = describers().get(format)?;
    let mut describer = factory();
    walk(declaration, &mut describer, exclude);
    describer.finalize()
}
