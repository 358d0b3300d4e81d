//! Plugin runtime for Pier sites.
//!
//! A plugin is a named unit that loads its own content and then contributes
//! to the site through optional capabilities: routes, global data, client
//! modules, HTML tags and default code translations. The runtime:
//!
//! 1. creates every declared instance through the [`PluginRegistry`],
//! 2. appends the synthetic bootstrap and Markdown fallback plugins,
//! 3. checks that instance ids are unique per plugin,
//! 4. loads content of all instances in parallel,
//! 5. aggregates contributions in declaration order into [`LoadedPlugins`].
//!
//! The crate also owns the version guard ([`check_plugin_versions`]), which
//! compares first-party plugin versions against the core version.

mod actions;
mod context;
mod error;
mod html_tags;
mod i18n;
mod ids;
mod manifest;
mod registry;
mod runtime;
mod synthetic;
#[cfg(test)]
mod testing;
mod versions;

use std::collections::BTreeMap;
use std::path::PathBuf;

pub use actions::{DataFile, GENERATED_ALIAS, RouteActions, plugin_dir_name};
pub use context::{DEFAULT_BUILD_DIR_NAME, GENERATED_FILES_DIR_NAME, LoadContext};
pub use error::PluginError;
pub use html_tags::{
    AttributeValue, HtmlTag, HtmlTagObject, HtmlTags, RenderedHtmlTags, render_tag,
};
pub use i18n::{Direction, I18n, LocaleConfig};
pub use ids::ensure_unique_plugin_ids;
pub use manifest::{MANIFEST_FILENAME, ManifestPlugin};
pub use registry::{PluginFactory, PluginRegistry, PresetFactory};
pub use runtime::{LoadedPlugins, PluginInstance, PluginSummary, init_plugins, load_plugins};
pub use synthetic::{
    BOOTSTRAP_PLUGIN_NAME, BootstrapPlugin, FALLBACK_TRANSFORM_FILE, MDX_FALLBACK_PLUGIN_NAME,
    MdxFallbackPlugin,
};
pub use versions::{
    CORE_VERSION, PluginVersion, SiteMetadata, VersionMismatch, check_plugin_versions,
};

/// A plugin instance.
///
/// Only [`name`](Plugin::name) is required. Capabilities are exposed through
/// the `*_provider` accessors; the runtime skips those returning `None`.
pub trait Plugin: Send + Sync {
    /// Plugin name, shared by all instances of the same plugin.
    fn name(&self) -> &str;

    /// Where the plugin comes from, reported in the site metadata.
    fn version(&self) -> PluginVersion {
        PluginVersion::Project
    }

    /// Directories holding content this plugin transforms itself.
    fn content_paths(&self) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Read and prepare content. Runs in parallel with other instances,
    /// before any contribution is collected.
    ///
    /// # Errors
    ///
    /// Returns an error if the content cannot be loaded.
    fn load_content(&mut self, _ctx: &LoadContext) -> Result<(), PluginError> {
        Ok(())
    }

    fn route_provider(&self) -> Option<&dyn RouteProvider> {
        None
    }

    fn global_data_provider(&self) -> Option<&dyn GlobalDataProvider> {
        None
    }

    fn client_modules_provider(&self) -> Option<&dyn ClientModulesProvider> {
        None
    }

    fn html_tags_provider(&self) -> Option<&dyn HtmlTagsProvider> {
        None
    }

    fn translations_provider(&self) -> Option<&dyn TranslationsProvider> {
        None
    }
}

/// Contributes routes and the data files they reference.
pub trait RouteProvider {
    /// # Errors
    ///
    /// Returns an error if the routes cannot be built from loaded content.
    fn contribute_routes(
        &self,
        ctx: &LoadContext,
        actions: &mut RouteActions,
    ) -> Result<(), PluginError>;
}

/// Contributes data readable by every page on the client.
pub trait GlobalDataProvider {
    fn global_data(&self) -> serde_json::Value;
}

/// Contributes modules loaded on the client before any page.
pub trait ClientModulesProvider {
    fn client_modules(&self) -> Vec<String>;
}

/// Contributes tags injected into every page.
pub trait HtmlTagsProvider {
    fn html_tags(&self) -> HtmlTags;
}

/// Contributes default messages for translatable UI strings.
pub trait TranslationsProvider {
    fn default_code_translations(&self) -> BTreeMap<String, String>;
}

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(PluginRegistry: Send, Sync);
    assert_impl_all!(PluginInstance: Send, Sync);
    assert_impl_all!(LoadContext: Send, Sync, Clone);
    assert_impl_all!(PluginError: Send, Sync, std::error::Error);
}
