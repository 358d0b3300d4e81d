//! First-party Pier modules.
//!
//! - `@pier/plugin-content-docs`: Markdown documentation with sidebars
//! - `@pier/theme-classic`: default theme client modules, tags and strings
//! - `@pier/preset-classic`: the two above, configured together
//!
//! [`register_builtins`] adds all of them to a [`PluginRegistry`].

mod docs;
mod preset_classic;
mod theme_classic;

use pier_plugin::{PluginError, PluginRegistry};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use docs::{DocMetadata, DocsError, DocsOptions, DocsPlugin, SidebarPathOption};
pub use preset_classic::{PresetClassicOptions, preset_classic};
pub use theme_classic::{ColorModeOptions, ThemeClassic, ThemeClassicOptions};

/// Module name of the documentation plugin.
pub const DOCS_PLUGIN_MODULE: &str = "@pier/plugin-content-docs";

/// Module name of the classic theme.
pub const THEME_CLASSIC_MODULE: &str = "@pier/theme-classic";

/// Module name of the classic preset.
pub const PRESET_CLASSIC_MODULE: &str = "@pier/preset-classic";

/// Register every first-party module.
pub fn register_builtins(registry: &mut PluginRegistry) {
    registry.register_plugin(DOCS_PLUGIN_MODULE, |ctx, descriptor| {
        let options = parse_options(DOCS_PLUGIN_MODULE, &descriptor.options)?;
        Ok(Box::new(DocsPlugin::new(
            ctx,
            descriptor.effective_id(),
            options,
        )))
    });
    registry.register_theme(THEME_CLASSIC_MODULE, |ctx, descriptor| {
        let options = parse_options(THEME_CLASSIC_MODULE, &descriptor.options)?;
        Ok(Box::new(ThemeClassic::new(ctx, options)?))
    });
    registry.register_preset(PRESET_CLASSIC_MODULE, |_, descriptor| {
        let options = parse_options(PRESET_CLASSIC_MODULE, &descriptor.options)?;
        preset_classic(&options)
    });
}

/// Deserialize module options, ignoring the instance `id` key.
fn parse_options<T: DeserializeOwned + Default>(
    module: &str,
    options: &Value,
) -> Result<T, PluginError> {
    let mut options = options.clone();
    if let Some(map) = options.as_object_mut() {
        map.remove("id");
    }
    if options.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(options).map_err(|e| PluginError::InvalidOptions {
        plugin: module.to_owned(),
        message: e.to_string(),
    })
}
