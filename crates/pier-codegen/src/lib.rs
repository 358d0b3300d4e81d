//! Generated-files emitter for Pier.
//!
//! Turns the loaded site model into the fixed set of files the client
//! bundler reads from the generated files directory. Rendering is
//! deterministic and writing is staged, so a build either leaves a complete
//! and consistent directory or fails without touching it.
//!
//! ```text
//! .pier/
//! +-- DONT-EDIT-THIS-FOLDER
//! +-- pier.config.js
//! +-- client-modules.js
//! +-- registry.js
//! +-- routes.js
//! +-- routesChunkNames.json
//! +-- globalData.json
//! +-- i18n.json
//! +-- codeTranslations.json
//! +-- site-metadata.json
//! +-- <plugin-name>/<plugin-id>/...   # plugin data files
//! ```

mod error;
mod render;
mod writer;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub use error::CodegenError;
pub use render::{
    CLIENT_MODULES_FILE, CODE_TRANSLATIONS_FILE, CodegenInput, GLOBAL_DATA_FILE, GeneratedFile,
    I18N_FILE, MARKER_FILE, REGISTRY_FILE, ROUTES_CHUNK_NAMES_FILE, ROUTES_FILE,
    SITE_CONFIG_FILE, SITE_METADATA_FILE, render,
};
pub use writer::{WriteSummary, write_files};

/// Render the site model and write it to `dir`.
///
/// Nothing is written when rendering fails.
///
/// # Errors
///
/// Returns an error if rendering fails or the directory cannot be updated.
pub fn generate(dir: &Path, input: &CodegenInput<'_>) -> Result<WriteSummary, CodegenError> {
    let files = render(input)?;
    write_files(dir, &files)
}

/// Remove the generated files directory.
///
/// Returns `false` when there was nothing to remove.
///
/// # Errors
///
/// Returns [`CodegenError::Io`] if the directory exists but cannot be removed.
pub fn clear(dir: &Path) -> Result<bool, CodegenError> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            tracing::info!(dir = %dir.display(), "Generated files removed");
            Ok(true)
        }
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(CodegenError::Io {
            path: dir.to_path_buf(),
            source,
        }),
    }
}
