//! `pier generate` command implementation.

use std::path::PathBuf;

use clap::Args;
use pier_config::CliSettings;
use pier_site::{LoadOptions, Props};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Site directory.
    #[arg(default_value = ".")]
    site_dir: PathBuf,

    /// Path to configuration file (default: auto-discover pier.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Locale to build (default: the site's default locale).
    #[arg(short, long)]
    locale: Option<String>,

    /// Output directory (default: <SITE_DIR>/build).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Base URL (overrides config).
    #[arg(long, env = "PIER_BASE_URL")]
    base_url: Option<String>,

    /// Enable verbose output (show stage timing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl GenerateArgs {
    /// Execute the generate command.
    ///
    /// # Errors
    ///
    /// Returns an error if any stage of the site load fails.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let options = LoadOptions {
            config: self.config,
            locale: self.locale,
            out_dir: self.out_dir,
            cli_settings: CliSettings {
                base_url: self.base_url,
                on_duplicate_routes: None,
            },
        };

        tracing::debug!(site_dir = %self.site_dir.display(), ?options, "Generating site");
        let props = pier_site::load(&self.site_dir, &options)?;
        report(output, &props);
        Ok(())
    }
}

fn report(output: &Output, props: &Props) {
    for mismatch in &props.version_mismatches {
        output.warning(&format!(
            "{} ({}) is at version {}, expected {}",
            mismatch.plugin, mismatch.package, mismatch.version, mismatch.expected
        ));
    }

    output.info(&format!(
        "Site: {} ({})",
        props.site_dir.display(),
        props.i18n.current_locale
    ));
    output.detail(&format!("Config: {}", props.site_config_path.display()));
    for plugin in &props.plugins {
        output.detail(&format!("Plugin: {}@{}", plugin.name, plugin.id));
    }
    output.detail(&format!("Routes: {}", props.routes_paths.len()));
    output.success(&format!(
        "Generated files in {}: {} written, {} unchanged, {} removed",
        props.generated_files_dir.display(),
        props.codegen.written,
        props.codegen.unchanged,
        props.codegen.removed
    ));
}
