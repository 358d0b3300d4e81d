//! Category metadata files (`_category_.json`, `_category_.yml`, ...).
//!
//! Every folder under the content root may carry one metadata file that
//! overrides the label, position and collapse settings of the category
//! generated for it. All files are read up front, before any sidebar is
//! processed, so an invalid file fails the load even if no sidebar uses its
//! folder.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::SidebarError;
use crate::normalize::parse_category_link;
use crate::types::CategoryLink;

/// Metadata file name without extension.
pub const CATEGORY_METADATA_BASENAME: &str = "_category_";

/// Accepted metadata extensions, in the order they win when several exist.
pub const CATEGORY_METADATA_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Link setting of a category metadata file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum MetadataLink {
    /// No `link` key: the folder's index document becomes the link, if any.
    #[default]
    Unset,
    /// `link: null`: the category has no link, even with an index document.
    Disabled,
    /// Explicit link.
    Link(CategoryLink),
}

/// Parsed contents of a category metadata file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryMetadata {
    pub label: Option<String>,
    pub position: Option<f64>,
    pub collapsed: Option<bool>,
    pub collapsible: Option<bool>,
    pub class_name: Option<String>,
    pub link: MetadataLink,
    pub custom_props: Option<Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RawCategoryMetadata {
    label: Option<String>,
    position: Option<f64>,
    collapsed: Option<bool>,
    collapsible: Option<bool>,
    #[serde(alias = "class_name")]
    class_name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    link: Option<serde_yaml::Value>,
    #[serde(alias = "custom_props")]
    custom_props: Option<Value>,
}

/// Distinguishes `link: null` from a missing `link` key.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_yaml::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_yaml::Value::deserialize(deserializer).map(Some)
}

/// A folder with more than one metadata file.
///
/// Exactly one warning is logged per record, so the records double as the
/// list of warnings emitted by a read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmbiguousMetadata {
    /// Folder relative to the content root.
    pub folder: String,
    /// Every metadata file found, in precedence order.
    pub files: Vec<PathBuf>,
}

impl AmbiguousMetadata {
    /// The file that is actually read.
    pub fn chosen(&self) -> &Path {
        &self.files[0]
    }
}

/// Metadata of every folder under a content root.
#[derive(Clone, Debug, Default)]
pub struct CategoriesMetadata {
    /// Metadata keyed by folder path relative to the content root.
    pub folders: HashMap<String, CategoryMetadata>,
    /// Folders where more than one metadata file was found.
    pub ambiguities: Vec<AmbiguousMetadata>,
}

impl CategoriesMetadata {
    /// Metadata for a folder, if it has any.
    pub fn get(&self, folder: &str) -> Option<&CategoryMetadata> {
        self.folders.get(folder)
    }
}

/// Read the metadata files of every folder under `content_path`.
///
/// Folders with several metadata files produce one warning each and the
/// first file in [`CATEGORY_METADATA_EXTENSIONS`] order is used. A missing
/// content directory yields no metadata.
///
/// # Errors
///
/// Returns [`SidebarError::CategoryMetadata`] for the first invalid file
/// (in folder order) and [`SidebarError::ContentDir`] if a folder cannot be
/// listed.
pub fn read_categories_metadata(content_path: &Path) -> Result<CategoriesMetadata, SidebarError> {
    let start = Instant::now();
    let mut found = Vec::new();
    if content_path.is_dir() {
        collect_metadata_files(content_path, ".", &mut found)?;
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));

    let mut ambiguities = Vec::new();
    for (folder, files) in &found {
        if files.len() > 1 {
            let listed: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
            tracing::warn!(
                folder = %folder,
                "There are more than one category metadata files for {folder}: {}. The behavior is undetermined.",
                listed.join(", ")
            );
            ambiguities.push(AmbiguousMetadata {
                folder: folder.clone(),
                files: files.clone(),
            });
        }
    }

    // Parse in parallel, then report the first failure in folder order
    let parsed: Vec<Result<(String, CategoryMetadata), SidebarError>> = found
        .par_iter()
        .map(|(folder, files)| {
            let metadata = read_metadata_file(&files[0], folder)?;
            Ok((folder.clone(), metadata))
        })
        .collect();
    let folders = parsed.into_iter().collect::<Result<HashMap<_, _>, _>>()?;

    tracing::debug!(
        folders = folders.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Category metadata loaded"
    );

    Ok(CategoriesMetadata {
        folders,
        ambiguities,
    })
}

/// Walk `dir` and record the metadata files of every folder.
fn collect_metadata_files(
    dir: &Path,
    folder: &str,
    found: &mut Vec<(String, Vec<PathBuf>)>,
) -> Result<(), SidebarError> {
    let files: Vec<PathBuf> = CATEGORY_METADATA_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{CATEGORY_METADATA_BASENAME}.{ext}")))
        .filter(|path| path.is_file())
        .collect();
    if !files.is_empty() {
        found.push((folder.to_owned(), files));
    }

    let entries = fs::read_dir(dir).map_err(|source| SidebarError::ContentDir {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let listing_error = |source| SidebarError::ContentDir {
            path: dir.to_path_buf(),
            source,
        };
        let entry = entry.map_err(listing_error)?;
        if !entry.file_type().map_err(listing_error)?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        // Hidden and partial folders never hold documents
        if name.starts_with('.') || name.starts_with('_') || name == "node_modules" {
            continue;
        }
        let child = if folder == "." {
            name
        } else {
            format!("{folder}/{name}")
        };
        collect_metadata_files(&entry.path(), &child, found)?;
    }
    Ok(())
}

fn read_metadata_file(file: &Path, folder: &str) -> Result<CategoryMetadata, SidebarError> {
    let invalid = |message: String| {
        tracing::error!(file = %file.display(), "The docs sidebar category metadata file looks invalid!");
        SidebarError::CategoryMetadata {
            file: file.to_path_buf(),
            folder: folder.to_owned(),
            message,
        }
    };

    let content = fs::read_to_string(file).map_err(|e| invalid(e.to_string()))?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(CategoryMetadata::default());
    }

    let raw: RawCategoryMetadata = if file.extension().is_some_and(|e| e == "json") {
        serde_json::from_str(trimmed).map_err(|e| invalid(e.to_string()))?
    } else {
        let mut value: serde_yaml::Value =
            serde_yaml::from_str(trimmed).map_err(|e| invalid(e.to_string()))?;
        value.apply_merge().map_err(|e| invalid(e.to_string()))?;
        serde_yaml::from_value(value).map_err(|e| invalid(e.to_string()))?
    };

    let link = match raw.link {
        None => MetadataLink::Unset,
        Some(serde_yaml::Value::Null) => MetadataLink::Disabled,
        Some(value) => MetadataLink::Link(parse_category_link(&value).map_err(invalid)?),
    };

    Ok(CategoryMetadata {
        label: raw.label,
        position: raw.position,
        collapsed: raw.collapsed,
        collapsible: raw.collapsible,
        class_name: raw.class_name,
        link,
        custom_props: raw.custom_props,
    })
}
