//! Pier CLI - static documentation site assembler.
//!
//! Provides commands for:
//! - `generate`: Load the site and write the generated files directory
//! - `clear`: Remove the generated files directory

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ClearArgs, GenerateArgs};
use output::Output;

/// Pier - static documentation site assembler.
#[derive(Parser)]
#[command(name = "pier", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the site and write the files the client bundler consumes.
    Generate(GenerateArgs),
    /// Remove the generated files directory.
    Clear(ClearArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Generate(args) if args.verbose);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Generate(args) => args.execute(&output),
        Commands::Clear(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// `--verbose` enables INFO level, otherwise use `RUST_LOG` or default to WARN.
fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "pier", "generate", "site", "--locale", "fr", "--out-dir", "dist", "-v",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Generate(ref args) if args.verbose));
    }

    #[test]
    fn test_parse_clear_defaults_to_current_dir() {
        let cli = Cli::try_parse_from(["pier", "clear"]).unwrap();

        assert!(matches!(cli.command, Commands::Clear(_)));
    }

    #[test]
    fn test_env_filter_defaults_to_warn() {
        // SAFETY: no other test reads or writes RUST_LOG
        unsafe { std::env::remove_var("RUST_LOG") };

        assert_eq!(env_filter(false).to_string(), "warn");
        assert_eq!(env_filter(true).to_string(), "info");
    }
}
