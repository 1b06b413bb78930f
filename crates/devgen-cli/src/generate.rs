//! # Generate Subcommand
//!
//! Builds a document and writes the generated files:
//!
//! - `main.cpp`: object declarations and the `setup()` body.
//! - `defines.h`: feature defines.
//! - `sdkconfig.defaults`: ESP-IDF configuration options.
//! - `build.json`: device, registered objects and build metadata.
//!
//! With `--check`, nothing is written. Existing files are compared against a
//! fresh build and any drift is reported.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use devgen_components::{build_document, BuildError, BuildOutput};

/// Arguments for the `devgen generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to the YAML build document.
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Output directory. Defaults to `build/<device name>`.
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,

    /// Verify existing files instead of writing them.
    #[arg(long)]
    pub check: bool,
}

/// Names of the generated files, in write order.
pub const GENERATED_FILES: [&str; 4] = ["main.cpp", "defines.h", "sdkconfig.defaults", "build.json"];

/// Render every generated file as `(file name, contents)`.
///
/// # Errors
///
/// Fails only if the manifest cannot be serialized.
pub fn render_files(output: &BuildOutput) -> Result<Vec<(&'static str, String)>> {
    let mut manifest = serde_json::to_string_pretty(&output.manifest())?;
    manifest.push('\n');
    Ok(vec![
        ("main.cpp", output.main_cpp()),
        ("defines.h", output.defines_h()),
        ("sdkconfig.defaults", output.sdkconfig_defaults()),
        ("build.json", manifest),
    ])
}

/// Execute the generate subcommand.
///
/// Returns exit code: 0 on success, 1 if the document is invalid or, under
/// `--check`, if any file is missing or outdated.
pub fn run_generate(args: &GenerateArgs) -> Result<u8> {
    let doc = crate::read_document(&args.path)?;

    let output = match build_document(&doc) {
        Ok(output) => output,
        Err(BuildError::Validation(e)) => {
            println!("INVALID: {}", args.path.display());
            println!("  {} error: {e}", e.kind());
            return Ok(1);
        }
        Err(e) => return Err(e.into()),
    };

    let out_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| Path::new("build").join(output.device.name.as_str()));
    let files = render_files(&output)?;

    if args.check {
        return check_files(&out_dir, &files);
    }

    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output directory: {}", out_dir.display()))?;
    for (name, contents) in &files {
        let path = out_dir.join(name);
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), bytes = contents.len(), "wrote generated file");
    }

    println!(
        "Generated {} files for '{}' in {} ({} objects)",
        files.len(),
        output.device.name,
        out_dir.display(),
        output.application.len()
    );
    Ok(0)
}

fn check_files(out_dir: &Path, files: &[(&'static str, String)]) -> Result<u8> {
    let mut outdated = Vec::new();
    for (name, expected) in files {
        let path = out_dir.join(name);
        match std::fs::read_to_string(&path) {
            Ok(existing) if existing == *expected => {}
            Ok(_) => outdated.push(format!("{name} is outdated")),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                outdated.push(format!("{name} is missing"))
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        }
    }

    if outdated.is_empty() {
        println!("OK: generated files in {} are up to date", out_dir.display());
        Ok(0)
    } else {
        for line in &outdated {
            println!("FAIL: {line}");
        }
        Ok(1)
    }
}
