//! Site loading errors.

use std::path::PathBuf;

use pier_codegen::CodegenError;
use pier_config::ConfigError;
use pier_plugin::PluginError;
use pier_routes::RouteError;

/// Error that aborts a site load.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The site directory does not exist or cannot be resolved.
    #[error("Site directory {} is not accessible: {source}", path.display())]
    SiteDir {
        /// Site directory as given.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The requested locale is not declared in `i18n.locales`.
    #[error("Unknown locale \"{locale}\". Available locales are: {}", .locales.join(", "))]
    UnknownLocale {
        /// Requested locale.
        locale: String,
        /// Declared locales.
        locales: Vec<String>,
    },

    /// The site's code translations file could not be read.
    #[error("Failed to read code translations {}: {source}", path.display())]
    CodeTranslationsIo {
        /// Translations file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The site's code translations file is malformed.
    #[error("Invalid code translations {}: {source}", path.display())]
    CodeTranslations {
        /// Translations file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Routes(#[from] RouteError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),
}
