//! `@pier/preset-classic`: the documentation plugin and the classic theme.

use pier_config::{PluginEntry, PluginLists};
use pier_plugin::PluginError;
use serde::Deserialize;
use serde_json::Value;

use crate::{DOCS_PLUGIN_MODULE, PRESET_CLASSIC_MODULE, THEME_CLASSIC_MODULE};

/// Options of `@pier/preset-classic`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PresetClassicOptions {
    /// Options of the documentation plugin, or `false` to leave it out.
    pub docs: Option<Value>,
    /// Options of the classic theme.
    pub theme: Option<Value>,
}

/// Plugins and themes bundled by the preset.
///
/// # Errors
///
/// Fails when `docs` is neither a table nor `false`, or `theme` is not a table.
pub fn preset_classic(options: &PresetClassicOptions) -> Result<PluginLists, PluginError> {
    let mut lists = PluginLists::default();

    match &options.docs {
        Some(Value::Bool(false)) => {}
        None => lists
            .plugins
            .push(PluginEntry::Shorthand(DOCS_PLUGIN_MODULE.to_owned())),
        Some(docs @ Value::Object(_)) => lists.plugins.push(PluginEntry::WithOptions(
            DOCS_PLUGIN_MODULE.to_owned(),
            docs.clone(),
        )),
        Some(other) => return Err(invalid(format!("`docs` must be a table or false, got {other}"))),
    }

    match &options.theme {
        None => lists
            .themes
            .push(PluginEntry::Shorthand(THEME_CLASSIC_MODULE.to_owned())),
        Some(theme @ Value::Object(_)) => lists.themes.push(PluginEntry::WithOptions(
            THEME_CLASSIC_MODULE.to_owned(),
            theme.clone(),
        )),
        Some(other) => return Err(invalid(format!("`theme` must be a table, got {other}"))),
    }

    Ok(lists)
}

fn invalid(message: String) -> PluginError {
    PluginError::InvalidOptions {
        plugin: PRESET_CLASSIC_MODULE.to_owned(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn options(value: Value) -> PresetClassicOptions {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_defaults_bundle_docs_and_theme() {
        let lists = preset_classic(&PresetClassicOptions::default()).unwrap();

        assert_eq!(
            lists.plugins,
            vec![PluginEntry::Shorthand(DOCS_PLUGIN_MODULE.to_owned())]
        );
        assert_eq!(
            lists.themes,
            vec![PluginEntry::Shorthand(THEME_CLASSIC_MODULE.to_owned())]
        );
    }

    #[test]
    fn test_options_forwarded() {
        let lists = preset_classic(&options(json!({
            "docs": {"path": "guides"},
            "theme": {"custom_css": "custom.css"}
        })))
        .unwrap();

        assert_eq!(
            lists.plugins,
            vec![PluginEntry::WithOptions(
                DOCS_PLUGIN_MODULE.to_owned(),
                json!({"path": "guides"})
            )]
        );
        assert_eq!(lists.themes.len(), 1);
    }

    #[test]
    fn test_docs_disabled() {
        let lists = preset_classic(&options(json!({"docs": false}))).unwrap();

        assert!(lists.plugins.is_empty());
        assert_eq!(lists.themes.len(), 1);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(preset_classic(&options(json!({"docs": true}))).is_err());
        assert!(preset_classic(&options(json!({"theme": "dark"}))).is_err());
        assert!(serde_json::from_value::<PresetClassicOptions>(json!({"blog": {}})).is_err());
    }
}
