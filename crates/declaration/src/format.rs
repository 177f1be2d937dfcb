//! Name to handler dispatch shared by the loader and the describer.

use indexmap::IndexMap;

use crate::error::DeclarationError;

/// Registry mapping a format name to a handler.
#[derive(Debug, Clone)]
pub struct FormatRegistry<H> {
    kind: &'static str,
    handlers: IndexMap<String, H>,
}

impl<H> FormatRegistry<H> {
    /// Create an empty registry. `kind` names the registry in error messages.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            handlers: IndexMap::new(),
        }
    }

    /// Register `handler` under `name`, replacing an earlier handler with the same name.
    pub fn register(&mut self, name: impl Into<String>, handler: H) -> &mut Self {
        let name = name.into();
        if self.handlers.insert(name.clone(), handler).is_some() {
            tracing::debug!(kind = self.kind, format = %name, "Replaced format handler");
        }
        self
    }

    pub fn get(&self, name: &str) -> Result<&H, DeclarationError> {
        self.handlers
            .get(name)
            .ok_or_else(|| DeclarationError::UnknownFormat {
                kind: self.kind,
                name: name.to_string(),
                available: self.names().map(str::to_string).collect(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}
