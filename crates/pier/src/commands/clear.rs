//! `pier clear` command implementation.

use std::path::PathBuf;

use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the clear command.
#[derive(Args)]
pub(crate) struct ClearArgs {
    /// Site directory.
    #[arg(default_value = ".")]
    site_dir: PathBuf,
}

impl ClearArgs {
    /// Execute the clear command.
    ///
    /// # Errors
    ///
    /// Returns an error if the generated files directory cannot be removed.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        if pier_site::clear(&self.site_dir)? {
            output.success("Removed the generated files directory.");
        } else {
            output.info("Nothing to clear.");
        }
        Ok(())
    }
}
