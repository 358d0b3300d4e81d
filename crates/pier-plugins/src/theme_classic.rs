//! `@pier/theme-classic`: default styles, client modules and UI strings.

use std::collections::BTreeMap;

use pier_plugin::{
    ClientModulesProvider, HtmlTag, HtmlTagObject, HtmlTags, HtmlTagsProvider, LoadContext,
    Plugin, PluginError, PluginVersion, TranslationsProvider,
};
use serde::Deserialize;

use crate::THEME_CLASSIC_MODULE;

const PLUGIN_NAME: &str = "pier-theme-classic";

const BUILTIN_CLIENT_MODULES: [&str; 3] = [
    "@pier/theme-classic/styles.css",
    "@pier/theme-classic/prism-include-languages",
    "@pier/theme-classic/nprogress",
];

const DEFAULT_TRANSLATIONS: [(&str, &str); 10] = [
    ("theme.NotFound.title", "Page Not Found"),
    (
        "theme.NotFound.p1",
        "We could not find what you were looking for.",
    ),
    ("theme.colorToggle.ariaLabel", "Switch between dark and light mode (currently {mode})"),
    ("theme.colorToggle.ariaLabel.mode.dark", "dark mode"),
    ("theme.colorToggle.ariaLabel.mode.light", "light mode"),
    ("theme.common.editThisPage", "Edit this page"),
    ("theme.docs.paginator.next", "Next"),
    ("theme.docs.paginator.previous", "Previous"),
    ("theme.docs.sidebar.collapseButtonTitle", "Collapse sidebar"),
    ("theme.docs.sidebar.expandButtonTitle", "Expand sidebar"),
];

/// One path or several.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

/// Options of `@pier/theme-classic`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThemeClassicOptions {
    /// Stylesheets loaded after the theme's own, relative to the site directory.
    custom_css: OneOrMany,
    pub color_mode: ColorModeOptions,
}

impl ThemeClassicOptions {
    pub fn custom_css(&self) -> Vec<String> {
        self.custom_css.clone().into_vec()
    }
}

/// Initial color mode settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorModeOptions {
    /// `light` or `dark`.
    pub default_mode: String,
    /// Follow the visitor's system preference when they have not chosen one.
    pub respect_prefers_color_scheme: bool,
}

impl Default for ColorModeOptions {
    fn default() -> Self {
        Self {
            default_mode: "light".to_owned(),
            respect_prefers_color_scheme: false,
        }
    }
}

/// The classic theme.
#[derive(Debug)]
pub struct ThemeClassic {
    client_modules: Vec<String>,
    color_mode: ColorModeOptions,
}

impl ThemeClassic {
    /// # Errors
    ///
    /// Fails when the color mode is unknown or a custom stylesheet does not exist.
    pub fn new(ctx: &LoadContext, options: ThemeClassicOptions) -> Result<Self, PluginError> {
        let invalid = |message: String| PluginError::InvalidOptions {
            plugin: THEME_CLASSIC_MODULE.to_owned(),
            message,
        };
        if !["light", "dark"].contains(&options.color_mode.default_mode.as_str()) {
            return Err(invalid(format!(
                "color_mode.default_mode must be \"light\" or \"dark\", got \"{}\"",
                options.color_mode.default_mode
            )));
        }

        let mut client_modules: Vec<String> =
            BUILTIN_CLIENT_MODULES.iter().map(|m| (*m).to_owned()).collect();
        for css in options.custom_css() {
            let path = ctx.site_dir.join(&css);
            if !path.is_file() {
                return Err(invalid(format!(
                    "custom CSS file {} does not exist",
                    path.display()
                )));
            }
            client_modules.push(path.display().to_string());
        }

        Ok(Self {
            client_modules,
            color_mode: options.color_mode,
        })
    }

    /// Script setting `data-theme` before the first paint.
    fn color_mode_script(&self) -> String {
        let system = if self.color_mode.respect_prefers_color_scheme {
            "window.matchMedia('(prefers-color-scheme: dark)').matches ? 'dark' : null"
        } else {
            "null"
        };
        format!(
            "(function() {{ var stored = null; try {{ stored = localStorage.getItem('theme'); }} catch (e) {{}} \
             document.documentElement.setAttribute('data-theme', stored || {system} || '{}'); }})();",
            self.color_mode.default_mode
        )
    }
}

impl Plugin for ThemeClassic {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn version(&self) -> PluginVersion {
        PluginVersion::first_party(THEME_CLASSIC_MODULE)
    }

    fn client_modules_provider(&self) -> Option<&dyn ClientModulesProvider> {
        Some(self)
    }

    fn html_tags_provider(&self) -> Option<&dyn HtmlTagsProvider> {
        Some(self)
    }

    fn translations_provider(&self) -> Option<&dyn TranslationsProvider> {
        Some(self)
    }
}

impl ClientModulesProvider for ThemeClassic {
    fn client_modules(&self) -> Vec<String> {
        self.client_modules.clone()
    }
}

impl HtmlTagsProvider for ThemeClassic {
    fn html_tags(&self) -> HtmlTags {
        let mut script = HtmlTagObject::new("script", std::iter::empty());
        script.inner_html = Some(self.color_mode_script());
        HtmlTags {
            pre_body: vec![HtmlTag::Element(script)],
            ..HtmlTags::default()
        }
    }
}

impl TranslationsProvider for ThemeClassic {
    fn default_code_translations(&self) -> BTreeMap<String, String> {
        DEFAULT_TRANSLATIONS
            .iter()
            .map(|(id, message)| ((*id).to_owned(), (*message).to_owned()))
            .collect()
    }
}
