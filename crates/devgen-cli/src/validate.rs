//! # Validate Subcommand
//!
//! Validates a build document without generating anything.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use devgen_components::{validate_document, BuildError};

/// Arguments for the `devgen validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the YAML build document.
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Print the validated configuration as JSON.
    #[arg(long)]
    pub dump: bool,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 if the document is valid, 1 otherwise.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let doc = crate::read_document(&args.path)?;

    match validate_document(&doc) {
        Ok(build) => {
            println!(
                "VALID: {} ({} instances, {} foreign domains)",
                args.path.display(),
                build.instances.len(),
                build.foreign.len()
            );
            if args.dump {
                println!("{}", serde_json::to_string_pretty(&build)?);
            }
            Ok(0)
        }
        Err(BuildError::Validation(e)) => {
            println!("INVALID: {}", args.path.display());
            println!("  {} error: {e}", e.kind());
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}
