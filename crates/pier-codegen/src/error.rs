//! Code generation errors.

use std::path::PathBuf;

/// Error raised while rendering or writing generated files.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    /// A document could not be serialized.
    #[error("Failed to serialize {file}: {source}")]
    Serialize {
        /// Generated file name.
        file: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// A plugin data file path escapes the generated files directory.
    #[error("Invalid generated file path {}: must be relative and stay inside the generated files directory", path.display())]
    InvalidPath {
        /// Offending path.
        path: PathBuf,
    },

    /// Two generated files share a path.
    #[error("Generated file {} is produced more than once", path.display())]
    DuplicateFile {
        /// Duplicated path.
        path: PathBuf,
    },

    /// Filesystem error.
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
