//! Sidebar loading errors.
//!
//! Every variant except [`SidebarError::Io`] is fatal for the whole sidebar
//! load: sidebars are produced all at once or not at all.

use std::path::PathBuf;

/// Error returned by [`load_sidebars`](crate::load_sidebars).
#[derive(Debug, thiserror::Error)]
pub enum SidebarError {
    /// The sidebar file could not be read.
    #[error("Failed to read sidebar file {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The sidebar file is not valid JSON/YAML.
    #[error("Failed to parse sidebar file {}: {message}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The sidebar file extension is not one of the accepted ones.
    #[error("Unsupported sidebar file {}: expected a .json, .yaml or .yml file", path.display())]
    UnsupportedFormat {
        /// Offending file.
        path: PathBuf,
    },

    /// The top-level value does not map sidebar names to sidebars.
    #[error("Sidebar file must map sidebar names to sidebars, got `{value}`")]
    InvalidSidebars {
        /// Offending value, rendered as JSON.
        value: String,
    },

    /// A sidebar is neither an item array nor a shorthand notation.
    #[error(
        "Invalid sidebar \"{sidebar}\": it must be an array of sidebar items or a shorthand notation, got `{value}`"
    )]
    InvalidSidebar {
        /// Sidebar name.
        sidebar: String,
        /// Offending value, rendered as JSON.
        value: String,
    },

    /// A category's `items` is not an array (nor a shorthand notation).
    #[error(
        "Invalid sidebar items collection `{value}` in `items` of the category {label}: it must either be an array of sidebar items or a shorthand notation (which doesn't contain a `type` property)."
    )]
    InvalidSidebarItems {
        /// Offending value, rendered as JSON.
        value: String,
        /// Label of the owning category.
        label: String,
    },

    /// An item does not match the shape of its declared type.
    #[error("Invalid sidebar item `{value}` in sidebar \"{sidebar}\": {message}")]
    InvalidItem {
        /// Sidebar name.
        sidebar: String,
        /// Offending item, rendered as JSON.
        value: String,
        /// Schema violation.
        message: String,
    },

    /// An item declares a `type` that is not known.
    #[error(
        "Unknown sidebar item type \"{item_type}\" in sidebar \"{sidebar}\". Valid types are: doc, ref, link, category, autogenerated."
    )]
    UnknownItemType {
        /// Sidebar name.
        sidebar: String,
        /// Declared type.
        item_type: String,
    },

    /// A category has no items and no link, so it cannot lead anywhere.
    #[error("Sidebar category \"{label}\" has neither any subitem nor a link.")]
    EmptyCategory {
        /// Category label.
        label: String,
    },

    /// A doc item references an unknown document.
    #[error(
        "Invalid sidebar: document id \"{id}\" referenced in sidebar \"{sidebar}\" does not exist.\nAvailable document ids are:\n{}",
        .available.iter().map(|id| format!("- {id}")).collect::<Vec<_>>().join("\n")
    )]
    DocNotFound {
        /// Unknown document id.
        id: String,
        /// Sidebar containing the reference.
        sidebar: String,
        /// Every known document id, sorted.
        available: Vec<String>,
    },

    /// A category metadata file failed schema validation.
    #[error(
        "The sidebar category metadata file {} for folder \"{folder}\" looks invalid: {message}",
        file.display()
    )]
    CategoryMetadata {
        /// Metadata file.
        file: PathBuf,
        /// Folder the file belongs to, relative to the content root.
        folder: String,
        /// Validation message.
        message: String,
    },

    /// The content directory could not be scanned for metadata files.
    #[error("Failed to scan content directory {}: {source}", path.display())]
    ContentDir {
        /// Directory being scanned.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
