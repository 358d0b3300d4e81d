//! Resolved locale information handed to plugins and written for the client.

use std::collections::BTreeMap;

use pier_config::{I18nConfig, LocaleConfigEntry};
use serde::Serialize;

/// Base languages written right to left.
const RTL_LANGUAGES: [&str; 5] = ["ar", "fa", "he", "ur", "yi"];

/// Text direction of a locale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

/// Display settings of one locale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleConfig {
    /// Name shown in locale pickers.
    pub label: String,
    /// Text direction.
    pub direction: Direction,
    /// Value of the `<html lang>` attribute.
    pub html_lang: String,
    /// URL segment and folder name of the locale.
    pub path: String,
}

impl LocaleConfig {
    /// Defaults for `locale`, overridden by whatever `entry` sets.
    pub fn resolve(locale: &str, entry: Option<&LocaleConfigEntry>) -> Self {
        let entry = entry.cloned().unwrap_or_default();
        let direction = match entry.direction.as_deref() {
            Some("rtl") => Direction::Rtl,
            Some(_) => Direction::Ltr,
            None => default_direction(locale),
        };
        Self {
            label: entry.label.unwrap_or_else(|| default_label(locale).to_owned()),
            direction,
            html_lang: entry.html_lang.unwrap_or_else(|| locale.to_owned()),
            path: entry.path.unwrap_or_else(|| locale.to_owned()),
        }
    }
}

/// Locales of the site and the one being built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct I18n {
    pub default_locale: String,
    pub locales: Vec<String>,
    pub current_locale: String,
    pub locale_configs: BTreeMap<String, LocaleConfig>,
}

impl I18n {
    /// Resolve the i18n settings for a build of `current_locale`.
    ///
    /// `current_locale` is expected to be one of `config.locales`.
    pub fn new(config: &I18nConfig, current_locale: &str) -> Self {
        let locale_configs = config
            .locales
            .iter()
            .map(|locale| {
                (
                    locale.clone(),
                    LocaleConfig::resolve(locale, config.locale_configs.get(locale)),
                )
            })
            .collect();
        Self {
            default_locale: config.default_locale.clone(),
            locales: config.locales.clone(),
            current_locale: current_locale.to_owned(),
            locale_configs,
        }
    }

    /// Whether the build targets the default locale.
    pub fn is_default_locale(&self) -> bool {
        self.current_locale == self.default_locale
    }

    /// Settings of the locale being built.
    pub fn current(&self) -> Option<&LocaleConfig> {
        self.locale_configs.get(&self.current_locale)
    }
}

fn default_direction(locale: &str) -> Direction {
    let language = locale.split(['-', '_']).next().unwrap_or(locale);
    if RTL_LANGUAGES.contains(&language.to_lowercase().as_str()) {
        Direction::Rtl
    } else {
        Direction::Ltr
    }
}

fn default_label(locale: &str) -> &str {
    match locale {
        "en" => "English",
        "fr" => "Français",
        "de" => "Deutsch",
        "es" => "Español",
        "it" => "Italiano",
        "pt" | "pt-BR" => "Português",
        "ru" => "Русский",
        "ja" => "日本語",
        "ko" => "한국어",
        "zh" | "zh-CN" | "zh-Hans" => "中文",
        "ar" => "العربية",
        "fa" => "فارسی",
        "he" => "עברית",
        other => other,
    }
}
