//! CLI error types.

use pier_site::LoadError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Load(#[from] LoadError),
}
