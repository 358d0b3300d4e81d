//! Documentation plugin errors.

use std::path::PathBuf;

use pier_sidebar::SidebarError;

/// Error raised while loading documentation content.
#[derive(Debug, thiserror::Error)]
pub enum DocsError {
    /// The configured content folder does not exist.
    #[error("The docs folder does not exist: {}", path.display())]
    MissingContentDir {
        /// Expected folder.
        path: PathBuf,
    },

    /// The content folder holds no document.
    #[error("No docs found in {}", path.display())]
    NoDocs {
        /// Content folder.
        path: PathBuf,
    },

    /// A document could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Document file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A document's front matter is not valid YAML of the expected shape.
    #[error("Invalid front matter in {}: {message}", path.display())]
    FrontMatter {
        /// Document file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// Two documents resolve to the same id.
    #[error("Duplicate doc id \"{id}\" in {} and {}", first.display(), second.display())]
    DuplicateDocId {
        /// Conflicting id.
        id: String,
        /// First document with the id.
        first: PathBuf,
        /// Second document with the id.
        second: PathBuf,
    },

    /// Sidebars could not be loaded.
    #[error(transparent)]
    Sidebar(#[from] SidebarError),
}
