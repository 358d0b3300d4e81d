//! Site-wide context shared by every plugin.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pier_config::SiteConfig;

use crate::i18n::I18n;

/// Name of the generated files directory inside the site directory.
pub const GENERATED_FILES_DIR_NAME: &str = ".pier";

/// Name of the default output directory inside the site directory.
pub const DEFAULT_BUILD_DIR_NAME: &str = "build";

/// Everything a plugin may know about the site being built.
#[derive(Clone, Debug)]
pub struct LoadContext {
    /// Site root directory.
    pub site_dir: PathBuf,
    /// Directory the code generator owns.
    pub generated_files_dir: PathBuf,
    /// Build output directory, localized for non-default locales.
    pub out_dir: PathBuf,
    /// Base URL, localized for non-default locales.
    pub base_url: String,
    /// Loaded site configuration.
    pub site_config: SiteConfig,
    /// Path the configuration was read from.
    pub site_config_path: PathBuf,
    /// Locale settings.
    pub i18n: I18n,
    /// Site-provided code translations for the current locale.
    pub code_translations: BTreeMap<String, String>,
}

impl LoadContext {
    /// Context for building `i18n.current_locale` of the site in `site_dir`.
    ///
    /// Non-default locales are served under `<base_url><locale path>/` and
    /// written to `<out_dir>/<locale path>`.
    pub fn new(
        site_dir: &Path,
        site_config: SiteConfig,
        site_config_path: PathBuf,
        i18n: I18n,
        out_dir: Option<PathBuf>,
    ) -> Self {
        let out_dir = out_dir.unwrap_or_else(|| site_dir.join(DEFAULT_BUILD_DIR_NAME));
        let (base_url, out_dir) = match i18n.current().filter(|_| !i18n.is_default_locale()) {
            Some(locale) => (
                format!("{}{}/", site_config.base_url, locale.path),
                out_dir.join(&locale.path),
            ),
            None => (site_config.base_url.clone(), out_dir),
        };
        Self {
            site_dir: site_dir.to_path_buf(),
            generated_files_dir: site_dir.join(GENERATED_FILES_DIR_NAME),
            out_dir,
            base_url,
            site_config,
            site_config_path,
            i18n,
            code_translations: BTreeMap::new(),
        }
    }

    /// Directory holding translation files of the current locale.
    pub fn localization_dir(&self) -> PathBuf {
        self.site_dir.join("i18n").join(&self.i18n.current_locale)
    }
}

#[cfg(test)]
mod tests {
    use pier_config::{I18nConfig, LocaleConfigEntry};

    use super::*;

    fn context(current: &str) -> LoadContext {
        let mut config = SiteConfig {
            base_url: "/site/".to_owned(),
            ..SiteConfig::default()
        };
        config.i18n = I18nConfig {
            default_locale: "en".to_owned(),
            locales: vec!["en".to_owned(), "fr".to_owned(), "pt-BR".to_owned()],
            ..I18nConfig::default()
        };
        config.i18n.locale_configs.insert(
            "pt-BR".to_owned(),
            LocaleConfigEntry {
                path: Some("br".to_owned()),
                ..LocaleConfigEntry::default()
            },
        );
        let i18n = I18n::new(&config.i18n, current);
        LoadContext::new(
            Path::new("/srv/site"),
            config,
            PathBuf::from("/srv/site/pier.toml"),
            i18n,
            None,
        )
    }

    #[test]
    fn test_default_locale_not_localized() {
        let ctx = context("en");

        assert_eq!(ctx.base_url, "/site/");
        assert_eq!(ctx.out_dir, PathBuf::from("/srv/site/build"));
        assert_eq!(ctx.generated_files_dir, PathBuf::from("/srv/site/.pier"));
    }

    #[test]
    fn test_other_locale_localized_by_path() {
        let fr = context("fr");
        let br = context("pt-BR");

        assert_eq!(fr.base_url, "/site/fr/");
        assert_eq!(fr.out_dir, PathBuf::from("/srv/site/build/fr"));
        assert_eq!(br.base_url, "/site/br/");
        assert_eq!(br.localization_dir(), PathBuf::from("/srv/site/i18n/pt-BR"));
    }
}
