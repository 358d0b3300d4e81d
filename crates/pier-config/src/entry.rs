//! Plugin, theme and preset entries and their resolution to descriptors.
//!
//! A site declares extensions in three surface forms:
//!
//! ```toml
//! plugins = [
//!     "content-docs",                                   # shorthand
//!     ["content-docs", { id = "api", path = "api" }],   # module + options
//!     { module = "./plugins/banner", id = "top" },      # explicit table
//! ]
//! ```
//!
//! All of them normalize to a [`PluginDescriptor`] whose `module` is the fully
//! qualified name returned by [`ShorthandResolver`].

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ConfigError, SiteConfig};

/// Instance id assumed when a plugin does not declare one.
pub const DEFAULT_PLUGIN_ID: &str = "default";

/// Namespace of first-party modules.
pub const FIRST_PARTY_SCOPE: &str = "@pier";

/// What a module reference points to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Content or behaviour plugin.
    Plugin,
    /// Theme (a plugin providing presentation modules).
    Theme,
    /// Bundle of plugins and themes.
    Preset,
}

impl ModuleKind {
    /// Lowercase name used in module-name patterns and messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plugin => "plugin",
            Self::Theme => "theme",
            Self::Preset => "preset",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A plugin/theme/preset entry as written in `pier.toml`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginEntry {
    /// Bare module name: `"content-docs"`.
    Shorthand(String),
    /// Module name with options: `["content-docs", { path = "docs" }]`.
    WithOptions(String, Value),
    /// Explicit table: `{ module = "...", id = "...", options = {...} }`.
    Descriptor(DescriptorEntry),
}

/// Table form of a [`PluginEntry`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescriptorEntry {
    /// Module name or shorthand.
    pub module: String,
    /// Instance id (overrides `options.id`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Plugin options.
    #[serde(default = "empty_options")]
    pub options: Value,
}

fn empty_options() -> Value {
    Value::Object(serde_json::Map::new())
}

impl PluginEntry {
    /// Module name as written, before shorthand resolution.
    #[must_use]
    pub fn module(&self) -> &str {
        match self {
            Self::Shorthand(module) | Self::WithOptions(module, _) => module,
            Self::Descriptor(entry) => &entry.module,
        }
    }
}

/// Normalized, fully qualified reference to a plugin, theme or preset.
///
/// Immutable once built; consumed by the plugin runtime.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PluginDescriptor {
    /// Fully qualified module name or absolute local path.
    pub module: String,
    /// Plugin or theme (or preset while presets are being expanded).
    pub kind: ModuleKind,
    /// Explicit instance id, if any.
    pub instance_id: Option<String>,
    /// Options passed to the module factory.
    pub options: Value,
}

impl PluginDescriptor {
    /// Instance id with the default applied.
    #[must_use]
    pub fn effective_id(&self) -> &str {
        self.instance_id.as_deref().unwrap_or(DEFAULT_PLUGIN_ID)
    }
}

/// Source of truth for which module names exist.
///
/// Implemented by the plugin registry; shorthand resolution asks it about each
/// candidate name in turn.
pub trait ModuleResolver {
    /// Whether `module` names a registered module of the given kind.
    fn has_module(&self, module: &str, kind: ModuleKind) -> bool;
}

/// Expands shorthand module names into fully qualified ones.
///
/// Local paths (`./x`, `../x`, absolute) resolve against the site directory,
/// the site's module-resolution root. Everything else goes through the
/// candidate patterns of [`name_candidates`].
pub struct ShorthandResolver<'a> {
    site_dir: &'a Path,
    modules: &'a dyn ModuleResolver,
}

impl<'a> ShorthandResolver<'a> {
    /// Create a resolver rooted at `site_dir`.
    #[must_use]
    pub fn new(site_dir: &'a Path, modules: &'a dyn ModuleResolver) -> Self {
        Self { site_dir, modules }
    }

    /// Resolve `name` to its fully qualified form.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnresolvedModule`] listing every candidate tried.
    pub fn resolve(&self, name: &str, kind: ModuleKind) -> Result<String, ConfigError> {
        if is_local_path(name) {
            let path = self.site_dir.join(name);
            return path
                .canonicalize()
                .map(|p| p.to_string_lossy().into_owned())
                .map_err(|_| ConfigError::UnresolvedModule {
                    name: name.to_owned(),
                    kind,
                    candidates: vec![path.to_string_lossy().into_owned()],
                });
        }

        let candidates = name_candidates(name, kind);
        candidates
            .iter()
            .find(|candidate| self.modules.has_module(candidate, kind))
            .cloned()
            .ok_or_else(|| ConfigError::UnresolvedModule {
                name: name.to_owned(),
                kind,
                candidates,
            })
    }

    /// Normalize one entry into a descriptor.
    ///
    /// A table entry's `id` is also written into its options, replacing any
    /// `id` found there.
    ///
    /// # Errors
    ///
    /// Fails when the module cannot be resolved or options are not a table.
    pub fn normalize(
        &self,
        entry: &PluginEntry,
        kind: ModuleKind,
    ) -> Result<PluginDescriptor, ConfigError> {
        let (module, explicit_id, options) = match entry {
            PluginEntry::Shorthand(module) => (module, None, empty_options()),
            PluginEntry::WithOptions(module, options) => (module, None, options.clone()),
            PluginEntry::Descriptor(entry) => (&entry.module, entry.id.clone(), entry.options.clone()),
        };

        let mut options = match options {
            Value::Null => empty_options(),
            Value::Object(_) => options,
            other => {
                return Err(ConfigError::InvalidEntry {
                    module: module.clone(),
                    message: format!("options must be a table, got `{other}`"),
                });
            }
        };

        // The table's `id` wins over the one inside its options
        if let Some(id) = &explicit_id
            && let Value::Object(map) = &mut options
        {
            map.insert("id".to_owned(), Value::String(id.clone()));
        }

        let instance_id = explicit_id.or_else(|| {
            options
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_owned)
        });

        Ok(PluginDescriptor {
            module: self.resolve(module, kind)?,
            kind,
            instance_id,
            options,
        })
    }

    /// Normalize a list of entries, preserving order.
    ///
    /// # Errors
    ///
    /// Fails on the first entry that cannot be normalized.
    pub fn normalize_all(
        &self,
        entries: &[PluginEntry],
        kind: ModuleKind,
    ) -> Result<Vec<PluginDescriptor>, ConfigError> {
        entries.iter().map(|e| self.normalize(e, kind)).collect()
    }
}

/// Plugins and themes contributed by one source (a preset, or the site).
#[derive(Clone, Debug, Default)]
pub struct PluginLists {
    /// Plugin entries in declaration order.
    pub plugins: Vec<PluginEntry>,
    /// Theme entries in declaration order.
    pub themes: Vec<PluginEntry>,
}

/// Merge preset-declared and site-declared entries into one ordered list.
///
/// The order is `[preset plugins, preset themes, site plugins, site themes]`.
/// Later entries have higher priority, so site entries always come last.
///
/// # Errors
///
/// Fails on the first entry whose module cannot be resolved.
pub fn resolve_plugin_configs(
    presets: &PluginLists,
    site: &SiteConfig,
    resolver: &ShorthandResolver<'_>,
) -> Result<Vec<PluginDescriptor>, ConfigError> {
    let mut descriptors = resolver.normalize_all(&presets.plugins, ModuleKind::Plugin)?;
    descriptors.extend(resolver.normalize_all(&presets.themes, ModuleKind::Theme)?);
    descriptors.extend(resolver.normalize_all(&site.plugins, ModuleKind::Plugin)?);
    descriptors.extend(resolver.normalize_all(&site.themes, ModuleKind::Theme)?);
    Ok(descriptors)
}

/// Candidate fully qualified names for a shorthand, in lookup order.
///
/// - `@scope` -> `@scope/pier-<kind>`
/// - `@scope/name` -> `@scope/name`, `@scope/pier-<kind>-name`
/// - `name` -> `name`, `@pier/<kind>-name`, `pier-<kind>-name`
#[must_use]
pub fn name_candidates(name: &str, kind: ModuleKind) -> Vec<String> {
    let kind = kind.as_str();
    if let Some(scoped) = name.strip_prefix('@') {
        return match scoped.split_once('/') {
            Some((scope, package)) => vec![
                format!("@{scope}/{package}"),
                format!("@{scope}/pier-{kind}-{package}"),
            ],
            None => vec![format!("@{scoped}/pier-{kind}")],
        };
    }
    vec![
        name.to_owned(),
        format!("{FIRST_PARTY_SCOPE}/{kind}-{name}"),
        format!("pier-{kind}-{name}"),
    ]
}

fn is_local_path(name: &str) -> bool {
    name.starts_with("./") || name.starts_with("../") || Path::new(name).is_absolute()
}
