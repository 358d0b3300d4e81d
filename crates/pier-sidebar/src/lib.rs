//! Documentation sidebars for Pier.
//!
//! A sidebar file maps sidebar names to trees of items. This crate reads
//! that file, expands every shorthand notation, replaces `autogenerated`
//! placeholders with items mirroring the content folders, applies
//! per-folder category metadata and resolves collapse settings.
//!
//! ```text
//! SidebarSource ──► normalize ──► expand/resolve ──► validate ──► Sidebars
//!                                     ▲
//!                   _category_.{json,yaml,yml} files
//! ```
//!
//! Loading is all-or-nothing: any invalid declaration, metadata file or
//! unknown document reference fails the whole load.

mod error;
mod generator;
mod metadata;
mod normalize;
mod number_prefix;
mod processor;
mod slug;
mod types;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub use error::SidebarError;
pub use generator::{DefaultSidebarItemsGenerator, GeneratorArgs, SidebarItemsGenerator};
pub use metadata::{
    AmbiguousMetadata, CATEGORY_METADATA_BASENAME, CATEGORY_METADATA_EXTENSIONS,
    CategoriesMetadata, CategoryMetadata, MetadataLink, read_categories_metadata,
};
pub use number_prefix::{
    DefaultNumberPrefixParser, DisabledNumberPrefixParser, NumberPrefixParser, ParsedFilename,
};
pub use processor::SidebarProcessorParams;
pub use slug::slugify;
pub use types::{
    CategoryLink, DocItem, LinkItem, NormalizedCategory, NormalizedItem, RefItem, SidebarCategory,
    SidebarDoc, SidebarItem, SidebarOptions, Sidebars,
};

/// Name of the sidebar produced when sidebars are fully autogenerated.
pub const DEFAULT_SIDEBAR_NAME: &str = "defaultSidebar";

/// Where sidebar declarations come from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SidebarSource {
    /// No source configured.
    #[default]
    Absent,
    /// Sidebars explicitly turned off.
    Disabled,
    /// One sidebar generated from the whole content folder.
    Autogenerated,
    /// A JSON or YAML sidebar file.
    File(PathBuf),
}

impl SidebarSource {
    /// Interpret a `sidebar_path` option value.
    ///
    /// `"false"` disables sidebars and `"auto"` generates them; anything
    /// else is a path resolved against `site_dir`.
    pub fn from_option(value: Option<&str>, site_dir: &Path) -> Self {
        match value.map(str::trim) {
            None => Self::Absent,
            Some("false" | "") => Self::Disabled,
            Some("auto" | "autogenerated") => Self::Autogenerated,
            Some(path) => Self::File(site_dir.join(path)),
        }
    }
}

/// Result of a sidebar load.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadedSidebars {
    /// No sidebars: the source was absent, disabled or missing.
    Disabled,
    /// Fully processed sidebars.
    Enabled(Sidebars),
}

impl LoadedSidebars {
    /// Sidebars, if enabled.
    pub fn sidebars(&self) -> Option<&Sidebars> {
        match self {
            Self::Disabled => None,
            Self::Enabled(sidebars) => Some(sidebars),
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}

/// Load, normalize and process sidebars.
///
/// An absent or disabled source, a path that does not exist and a file
/// whose content is `false` (or empty) all yield [`LoadedSidebars::Disabled`].
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, if any item or
/// category metadata file is invalid, if a category ends up with neither
/// items nor link, or if a document reference is unknown.
pub fn load_sidebars(
    source: &SidebarSource,
    params: &SidebarProcessorParams<'_>,
) -> Result<LoadedSidebars, SidebarError> {
    let start = Instant::now();

    let normalized = match source {
        SidebarSource::Absent | SidebarSource::Disabled => return Ok(LoadedSidebars::Disabled),
        SidebarSource::Autogenerated => normalize::NormalizedSidebars::from([(
            DEFAULT_SIDEBAR_NAME.to_owned(),
            vec![NormalizedItem::Autogenerated {
                dir_name: ".".to_owned(),
            }],
        )]),
        SidebarSource::File(path) => {
            if !path.exists() {
                tracing::debug!(path = %path.display(), "Sidebar file not found, sidebars disabled");
                return Ok(LoadedSidebars::Disabled);
            }
            let raw = read_sidebars_file(path)?;
            match normalize::normalize_sidebars(&raw)? {
                Some(sidebars) => sidebars,
                None => return Ok(LoadedSidebars::Disabled),
            }
        }
    };

    let metadata = read_categories_metadata(params.content_path)?;
    let sidebars = processor::process_sidebars(normalized, &metadata, params)?;

    tracing::info!(
        sidebars = sidebars.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Sidebars loaded"
    );
    Ok(LoadedSidebars::Enabled(sidebars))
}

/// Parse a sidebar file into an untyped value, keeping mapping order.
fn read_sidebars_file(path: &Path) -> Result<serde_yaml::Value, SidebarError> {
    let content = fs::read_to_string(path).map_err(|source| SidebarError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(serde_yaml::Value::Null);
    }

    let parse_error = |message: String| SidebarError::Parse {
        path: path.to_path_buf(),
        message,
    };
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
        Some("yaml" | "yml") => {
            let mut value: serde_yaml::Value =
                serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))?;
            value.apply_merge().map_err(|e| parse_error(e.to_string()))?;
            Ok(value)
        }
        _ => Err(SidebarError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}
