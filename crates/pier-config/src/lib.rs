//! Site configuration for Pier.
//!
//! Parses `pier.toml` with serde and provides auto-discovery of the config
//! file in the site directory and its parents. Plugin, theme and preset
//! entries are normalized by the [`entry`] module.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String values of `url` and `base_url` support `${VAR}` and
//! `${VAR:-default}` expansion.

mod entry;
mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use entry::{
    DEFAULT_PLUGIN_ID, DescriptorEntry, FIRST_PARTY_SCOPE, ModuleKind, ModuleResolver,
    PluginDescriptor, PluginEntry, PluginLists, ShorthandResolver, name_candidates,
    resolve_plugin_configs,
};

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "pier.toml";

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the base URL.
    pub base_url: Option<String>,
    /// Override the duplicate-route policy.
    pub on_duplicate_routes: Option<ReportingSeverity>,
}

/// How a recoverable problem is reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportingSeverity {
    /// Do nothing.
    Ignore,
    /// Log at info level.
    Log,
    /// Log at warn level.
    #[default]
    Warn,
    /// Log at error level; the build continues.
    Error,
    /// Fail the build.
    Throw,
}

/// Site configuration as declared in `pier.toml`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,
    /// Public origin of the site (e.g. `https://docs.example.com`).
    pub url: String,
    /// Path under `url` the site is served from. Starts and ends with `/`.
    pub base_url: String,
    /// Site version reported in the site metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Policy for routes declared more than once.
    pub on_duplicate_routes: ReportingSeverity,
    /// Presets, expanded before plugins and themes.
    pub presets: Vec<PluginEntry>,
    /// Site-level plugins (higher priority than preset plugins).
    pub plugins: Vec<PluginEntry>,
    /// Site-level themes (highest priority).
    pub themes: Vec<PluginEntry>,
    /// Stylesheets injected into every page head.
    pub stylesheets: Vec<AssetEntry>,
    /// Scripts injected into every page head.
    pub scripts: Vec<AssetEntry>,
    /// Client modules loaded on every page, after plugin modules.
    pub client_modules: Vec<String>,
    /// Internationalization settings.
    pub i18n: I18nConfig,
    /// Free-form values restated into the generated config.
    pub custom_fields: BTreeMap<String, serde_json::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            url: String::new(),
            base_url: "/".to_owned(),
            version: None,
            on_duplicate_routes: ReportingSeverity::default(),
            presets: Vec::new(),
            plugins: Vec::new(),
            themes: Vec::new(),
            stylesheets: Vec::new(),
            scripts: Vec::new(),
            client_modules: Vec::new(),
            i18n: I18nConfig::default(),
            custom_fields: BTreeMap::new(),
        }
    }
}

/// Stylesheet or script reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetEntry {
    /// Plain URL (`href` for stylesheets, `src` for scripts).
    Url(String),
    /// Explicit attribute table.
    Attributes(BTreeMap<String, String>),
}

/// Internationalization settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct I18nConfig {
    /// Locale served at the root path.
    pub default_locale: String,
    /// All locales, in display order.
    pub locales: Vec<String>,
    /// Per-locale overrides.
    pub locale_configs: BTreeMap<String, LocaleConfigEntry>,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: "en".to_owned(),
            locales: vec!["en".to_owned()],
            locale_configs: BTreeMap::new(),
        }
    }
}

/// Per-locale overrides; unset fields take computed defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LocaleConfigEntry {
    /// Label shown in locale pickers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// `ltr` or `rtl`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    /// Value of the `lang` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_lang: Option<String>,
    /// URL/filesystem path segment for this locale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g. `base_url`).
        field: String,
        /// Error message (e.g. "${`BASE_URL`} not set").
        message: String,
    },
    /// A plugin/theme/preset name could not be resolved.
    #[error(
        "Unable to resolve the \"{name}\" {kind}. Make sure one of the following modules is available:\n{}",
        .candidates.iter().map(|c| format!("- {c}")).collect::<Vec<_>>().join("\n")
    )]
    UnresolvedModule {
        /// Name as written in the config.
        name: String,
        /// Plugin, theme or preset.
        kind: ModuleKind,
        /// Every candidate that was tried.
        candidates: Vec<String>,
    },
    /// Malformed plugin/theme/preset entry.
    #[error("Invalid entry for module \"{module}\": {message}")]
    InvalidEntry {
        /// Module name as written.
        module: String,
        /// What is wrong with it.
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl SiteConfig {
    /// Load site configuration.
    ///
    /// If `config_path` is provided, loads from that file (relative paths are
    /// taken from `site_dir`). Otherwise searches for `pier.toml` in
    /// `site_dir` and its parents.
    ///
    /// Returns the config together with the path it was read from.
    ///
    /// # Errors
    ///
    /// Returns error if no config file exists, parsing fails or validation fails.
    pub fn load(
        site_dir: &Path,
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<(Self, PathBuf), ConfigError> {
        let path = match config_path {
            Some(path) => {
                let path = site_dir.join(path);
                if !path.exists() {
                    return Err(ConfigError::NotFound(path));
                }
                path
            }
            None => Self::discover_config(site_dir)
                .ok_or_else(|| ConfigError::NotFound(site_dir.join(CONFIG_FILENAME)))?,
        };

        let mut config = Self::load_from_file(&path)?;
        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok((config, path))
    }

    /// Parse configuration from TOML text, expand and validate it.
    ///
    /// # Errors
    ///
    /// Returns error on parse, expansion or validation failure.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(base_url) = &settings.base_url {
            self.base_url.clone_from(base_url);
        }
        if let Some(policy) = settings.on_duplicate_routes {
            self.on_duplicate_routes = policy;
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with('/') || !self.base_url.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "base_url must start and end with a slash, got \"{}\"",
                self.base_url
            )));
        }
        if !self.url.is_empty() {
            require_http_url(&self.url, "url")?;
        }
        self.validate_i18n()
    }

    fn validate_i18n(&self) -> Result<(), ConfigError> {
        let i18n = &self.i18n;
        require_non_empty(&i18n.default_locale, "i18n.default_locale")?;
        if !i18n.locales.contains(&i18n.default_locale) {
            return Err(ConfigError::Validation(format!(
                "i18n.locales must contain the default locale \"{}\"",
                i18n.default_locale
            )));
        }
        if let Some(unknown) = i18n
            .locale_configs
            .keys()
            .find(|locale| !i18n.locales.contains(locale))
        {
            return Err(ConfigError::Validation(format!(
                "i18n.locale_configs has an entry for \"{unknown}\" which is not in i18n.locales"
            )));
        }
        if let Some(direction) = i18n
            .locale_configs
            .values()
            .filter_map(|c| c.direction.as_deref())
            .find(|d| *d != "ltr" && *d != "rtl")
        {
            return Err(ConfigError::Validation(format!(
                "i18n direction must be \"ltr\" or \"rtl\", got \"{direction}\""
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.url = expand::expand_env(&self.url, "url")?;
        self.base_url = expand::expand_env(&self.base_url, "base_url")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = SiteConfig::from_toml("").unwrap();
        assert_eq!(config.base_url, "/");
        assert_eq!(config.on_duplicate_routes, ReportingSeverity::Warn);
        assert_eq!(config.i18n.default_locale, "en");
        assert_eq!(config.i18n.locales, vec!["en"]);
        assert!(config.plugins.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
title = "My Site"
url = "https://docs.example.com"
base_url = "/docs/"
version = "1.2.0"
on_duplicate_routes = "throw"
presets = [["classic", { docs = { path = "guides" } }]]
plugins = ["./plugins/banner"]
stylesheets = ["https://cdn.example.com/x.css", { href = "/y.css", media = "print" }]
client_modules = ["./src/analytics.js"]

[i18n]
default_locale = "en"
locales = ["en", "fr"]

[i18n.locale_configs.fr]
label = "Français"

[custom_fields]
team = "docs"
"#;
        let config = SiteConfig::from_toml(toml).unwrap();
        assert_eq!(config.title, "My Site");
        assert_eq!(config.base_url, "/docs/");
        assert_eq!(config.version.as_deref(), Some("1.2.0"));
        assert_eq!(config.on_duplicate_routes, ReportingSeverity::Throw);
        assert_eq!(config.presets.len(), 1);
        assert_eq!(config.presets[0].module(), "classic");
        assert_eq!(config.stylesheets.len(), 2);
        assert!(matches!(config.stylesheets[1], AssetEntry::Attributes(_)));
        assert_eq!(
            config.i18n.locale_configs["fr"].label.as_deref(),
            Some("Français")
        );
        assert_eq!(config.custom_fields["team"], serde_json::json!("docs"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = SiteConfig::from_toml("baseUrl = \"/\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validate_base_url_slashes() {
        let err = SiteConfig::from_toml("base_url = \"docs\"").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_validate_url_scheme() {
        let err = SiteConfig::from_toml("url = \"docs.example.com\"").unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_validate_default_locale_in_locales() {
        let toml = r#"
[i18n]
default_locale = "de"
locales = ["en"]
"#;
        let err = SiteConfig::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("\"de\""));
    }

    #[test]
    fn test_validate_locale_config_for_unknown_locale() {
        let toml = r#"
[i18n.locale_configs.fr]
label = "Français"
"#;
        let err = SiteConfig::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("\"fr\""));
    }

    #[test]
    fn test_load_discovers_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "title = \"Found\"").unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let (config, path) = SiteConfig::load(&nested, None, None).unwrap();
        assert_eq!(config.title, "Found");
        assert_eq!(path, dir.path().join(CONFIG_FILENAME));
    }

    #[test]
    fn test_load_explicit_path_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = SiteConfig::load(dir.path(), Some(Path::new("custom.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_applies_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "base_url = \"/a/\"").unwrap();
        let settings = CliSettings {
            base_url: Some("/b/".to_owned()),
            on_duplicate_routes: Some(ReportingSeverity::Ignore),
        };

        let (config, _) = SiteConfig::load(dir.path(), None, Some(&settings)).unwrap();
        assert_eq!(config.base_url, "/b/");
        assert_eq!(config.on_duplicate_routes, ReportingSeverity::Ignore);
    }

    #[test]
    fn test_load_rejects_invalid_cli_base_url() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();
        let settings = CliSettings {
            base_url: Some("nope".to_owned()),
            ..Default::default()
        };
        let err = SiteConfig::load(dir.path(), None, Some(&settings)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_expand_env_in_base_url() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("PIER_CFG_BASE", "/preview/");
        }
        let config = SiteConfig::from_toml("base_url = \"${PIER_CFG_BASE}\"").unwrap();
        assert_eq!(config.base_url, "/preview/");
        unsafe {
            std::env::remove_var("PIER_CFG_BASE");
        }
    }

    #[test]
    fn test_serialize_roundtrips_site_entries() {
        let config = SiteConfig::from_toml("plugins = [[\"content-docs\", { id = \"api\" }]]").unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["plugins"], serde_json::json!([["content-docs", {"id": "api"}]]));
        assert_eq!(json["base_url"], serde_json::json!("/"));
    }
}
