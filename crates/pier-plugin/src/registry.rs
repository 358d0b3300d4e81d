//! Named module factories, looked up by canonical module name.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use pier_config::{ModuleKind, ModuleResolver, PluginDescriptor, PluginLists};

use crate::Plugin;
use crate::context::LoadContext;
use crate::error::PluginError;
use crate::manifest::ManifestPlugin;

/// Creates a plugin or theme instance from its descriptor.
pub type PluginFactory =
    Box<dyn Fn(&LoadContext, &PluginDescriptor) -> Result<Box<dyn Plugin>, PluginError> + Send + Sync>;

/// Expands a preset into the plugins and themes it bundles.
pub type PresetFactory =
    Box<dyn Fn(&LoadContext, &PluginDescriptor) -> Result<PluginLists, PluginError> + Send + Sync>;

/// Every module a site can reference by name.
///
/// Local modules (absolute paths, produced by shorthand resolution from
/// `./` and `../` references) are not registered; they load from a
/// `plugin.toml` manifest instead.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, PluginFactory>,
    themes: BTreeMap<String, PluginFactory>,
    presets: BTreeMap<String, PresetFactory>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin module under its fully qualified name.
    pub fn register_plugin<F>(&mut self, module: &str, factory: F)
    where
        F: Fn(&LoadContext, &PluginDescriptor) -> Result<Box<dyn Plugin>, PluginError>
            + Send
            + Sync
            + 'static,
    {
        self.plugins.insert(module.to_owned(), Box::new(factory));
    }

    /// Register a theme module under its fully qualified name.
    pub fn register_theme<F>(&mut self, module: &str, factory: F)
    where
        F: Fn(&LoadContext, &PluginDescriptor) -> Result<Box<dyn Plugin>, PluginError>
            + Send
            + Sync
            + 'static,
    {
        self.themes.insert(module.to_owned(), Box::new(factory));
    }

    /// Register a preset module under its fully qualified name.
    pub fn register_preset<F>(&mut self, module: &str, factory: F)
    where
        F: Fn(&LoadContext, &PluginDescriptor) -> Result<PluginLists, PluginError>
            + Send
            + Sync
            + 'static,
    {
        self.presets.insert(module.to_owned(), Box::new(factory));
    }

    /// Instantiate the plugin or theme a descriptor refers to.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnknownModule`] if nothing is registered under
    /// the descriptor's module, or whatever the factory or manifest loader
    /// fails with.
    pub fn create(
        &self,
        ctx: &LoadContext,
        descriptor: &PluginDescriptor,
    ) -> Result<Box<dyn Plugin>, PluginError> {
        let factories = match descriptor.kind {
            ModuleKind::Plugin => &self.plugins,
            ModuleKind::Theme => &self.themes,
            ModuleKind::Preset => return Err(unknown(descriptor)),
        };
        if let Some(factory) = factories.get(&descriptor.module) {
            return factory(ctx, descriptor);
        }
        let path = Path::new(&descriptor.module);
        if path.is_absolute() {
            return Ok(Box::new(ManifestPlugin::load(path, ctx)?));
        }
        Err(unknown(descriptor))
    }

    /// Expand a preset descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnknownModule`] if no preset is registered
    /// under the descriptor's module.
    pub fn preset(
        &self,
        ctx: &LoadContext,
        descriptor: &PluginDescriptor,
    ) -> Result<PluginLists, PluginError> {
        let factory = self
            .presets
            .get(&descriptor.module)
            .ok_or_else(|| unknown(descriptor))?;
        factory(ctx, descriptor)
    }
}

fn unknown(descriptor: &PluginDescriptor) -> PluginError {
    PluginError::UnknownModule {
        module: descriptor.module.clone(),
        kind: descriptor.kind,
    }
}

impl ModuleResolver for PluginRegistry {
    fn has_module(&self, module: &str, kind: ModuleKind) -> bool {
        match kind {
            ModuleKind::Plugin => self.plugins.contains_key(module),
            ModuleKind::Theme => self.themes.contains_key(module),
            ModuleKind::Preset => self.presets.contains_key(module),
        }
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .field("themes", &self.themes.keys().collect::<Vec<_>>())
            .field("presets", &self.presets.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::testing::{StaticPlugin, context};

    fn descriptor(module: &str, kind: ModuleKind) -> PluginDescriptor {
        PluginDescriptor {
            module: module.to_owned(),
            kind,
            instance_id: None,
            options: json!({}),
        }
    }

    #[test]
    fn test_create_registered_plugin() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/");
        let mut registry = PluginRegistry::new();
        registry.register_plugin("@pier/plugin-x", |_, _| Ok(Box::new(StaticPlugin::new("x"))));

        let plugin = registry
            .create(&ctx, &descriptor("@pier/plugin-x", ModuleKind::Plugin))
            .unwrap();

        assert_eq!(plugin.name(), "x");
        assert!(registry.has_module("@pier/plugin-x", ModuleKind::Plugin));
        assert!(!registry.has_module("@pier/plugin-x", ModuleKind::Theme));
    }

    #[test]
    fn test_kind_is_respected() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/");
        let mut registry = PluginRegistry::new();
        registry.register_theme("@pier/theme-x", |_, _| Ok(Box::new(StaticPlugin::new("x"))));

        let err = registry
            .create(&ctx, &descriptor("@pier/theme-x", ModuleKind::Plugin))
            .err()
            .unwrap();

        assert!(matches!(
            err,
            PluginError::UnknownModule { kind: ModuleKind::Plugin, .. }
        ));
    }

    #[test]
    fn test_absolute_path_loads_manifest() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("plugin.toml"), "name = \"local\"\n").unwrap();
        let ctx = context(temp.path(), "/");
        let registry = PluginRegistry::new();
        let module = temp.path().display().to_string();

        let plugin = registry
            .create(&ctx, &descriptor(&module, ModuleKind::Plugin))
            .unwrap();

        assert_eq!(plugin.name(), "local");
    }

    #[test]
    fn test_preset_expansion() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/");
        let mut registry = PluginRegistry::new();
        registry.register_preset("@pier/preset-x", |_, descriptor| {
            let mut lists = PluginLists::default();
            if descriptor.options["docs"] != json!(false) {
                lists
                    .plugins
                    .push(pier_config::PluginEntry::Shorthand("content-docs".to_owned()));
            }
            Ok(lists)
        });

        let mut preset = descriptor("@pier/preset-x", ModuleKind::Preset);
        let lists = registry.preset(&ctx, &preset).unwrap();
        preset.options = json!({"docs": false});
        let without_docs = registry.preset(&ctx, &preset).unwrap();

        assert_eq!(lists.plugins.len(), 1);
        assert!(without_docs.plugins.is_empty());
        assert!(registry.preset(&ctx, &descriptor("nope", ModuleKind::Preset)).is_err());
    }
}
