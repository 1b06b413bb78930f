//! # devgen CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use devgen_cli::components::{run_components, ComponentsArgs};
use devgen_cli::generate::{run_generate, GenerateArgs};
use devgen_cli::validate::{run_validate, ValidateArgs};

/// devgen: peripheral configuration validator and setup code generator.
///
/// Resolves a YAML build document against the declared peripheral schemas
/// and emits the firmware setup code, feature defines and build metadata.
#[derive(Parser, Debug)]
#[command(name = "devgen", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a build document.
    Validate(ValidateArgs),

    /// Generate setup code and build metadata, or verify it with --check.
    Generate(GenerateArgs),

    /// List peripheral kinds and their configuration fields.
    Components(ComponentsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr so generated output on stdout stays clean.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "devgen starting");

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args),
        Commands::Generate(args) => run_generate(&args),
        Commands::Components(args) => run_components(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
