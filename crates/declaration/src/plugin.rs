//! Plugin contracts consumed by the declaration registry.
//!
//! Responsibilities:
//! - Define the capability a plugin implements to declare its own options.
//! - Define the lookup/enumeration contract of the host's plugin registry.
//! - Provide `PluginSet`, an in-memory registry for hosts and tests.
//!
//! Does NOT handle:
//! - Discovering or loading plugins.
//!
//! Invariants:
//! - `PluginRegistry::plugins` yields plugins in registration order.

use crate::declaration::Declaration;
use crate::error::DeclarationError;
use crate::key::Key;

/// Capability of plugins that declare configuration options.
pub trait DeclareConfigOptions {
    /// Declare options on `declaration`. `root` is the key the plugin declares under.
    fn declare_config_options(
        &self,
        declaration: &mut Declaration,
        root: &Key,
    ) -> Result<(), DeclarationError>;
}

/// A plugin known to the host application.
pub trait Plugin {
    fn name(&self) -> &str;

    /// The declaration capability, if this plugin implements it.
    fn config_declarer(&self) -> Option<&dyn DeclareConfigOptions> {
        None
    }
}

/// Lookup and enumeration of the host's enabled plugins.
pub trait PluginRegistry {
    fn get(&self, name: &str) -> Option<&dyn Plugin>;

    /// All plugins in registration order.
    fn plugins(&self) -> Vec<&dyn Plugin>;

    /// Plugins implementing `DeclareConfigOptions`, in registration order.
    fn config_declarers(&self) -> Vec<(&str, &dyn DeclareConfigOptions)> {
        self.plugins()
            .into_iter()
            .filter_map(|plugin| {
                plugin
                    .config_declarer()
                    .map(move |hook| (plugin.name(), hook))
            })
            .collect()
    }
}

/// Ordered in-memory plugin registry.
#[derive(Default)]
pub struct PluginSet {
    plugins: Vec<Box<dyn Plugin>>,
}

impl PluginSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin. A plugin with the same name is replaced in place.
    pub fn register(&mut self, plugin: Box<dyn Plugin>) -> &mut Self {
        match self.plugins.iter().position(|p| p.name() == plugin.name()) {
            Some(index) => self.plugins[index] = plugin,
            None => self.plugins.push(plugin),
        }
        self
    }

    pub fn with(mut self, plugin: impl Plugin + 'static) -> Self {
        self.register(Box::new(plugin));
        self
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl PluginRegistry for PluginSet {
    fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .find(|plugin| plugin.name() == name)
            .map(|plugin| plugin.as_ref() as &dyn Plugin)
    }

    fn plugins(&self) -> Vec<&dyn Plugin> {
        self.plugins.iter().map(|plugin| plugin.as_ref() as &dyn Plugin).collect()
    }
}
