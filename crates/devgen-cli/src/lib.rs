//! # devgen-cli: Command-Line Interface
//!
//! Provides the `devgen` binary.
//!
//! ## Subcommands
//!
//! - `devgen validate <FILE>`: validate a build document.
//! - `devgen generate <FILE>`: write `main.cpp`, `defines.h`,
//!   `sdkconfig.defaults` and `build.json`; `--check` verifies them instead.
//! - `devgen components`: list peripheral kinds and their fields.
//!
//! ```bash
//! devgen validate devices/livingroom.yaml
//! devgen generate devices/livingroom.yaml --output-dir build/livingroom
//! devgen generate devices/livingroom.yaml --output-dir build/livingroom --check
//! ```
//!
//! ## Exit codes
//!
//! 0 on success, 1 on an invalid document, drift under `--check`, or an
//! operational failure.
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from handlers. Handlers return
//!   `anyhow::Result<u8>` with the exit code.
//! - Handlers delegate to the library crates; no validation logic here.

pub mod components;
pub mod generate;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use devgen_schema::load_yaml;
use serde_json::Value;

/// Read and parse a YAML build document.
///
/// # Errors
///
/// Fails if the file cannot be read or is not a YAML mapping.
pub fn read_document(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read build document: {}", path.display()))?;
    load_yaml(&text).with_context(|| format!("failed to load build document: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_document_parses_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev.yaml");
        std::fs::write(&path, "device:\n  name: hall\n  platform: esp32\n").unwrap();
        let doc = read_document(&path).unwrap();
        assert_eq!(doc["device"]["name"], "hall");
    }

    #[test]
    fn read_document_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read build document"));
    }

    #[test]
    fn read_document_rejects_scalar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev.yaml");
        std::fs::write(&path, "just a string\n").unwrap();
        let err = read_document(&path).unwrap_err();
        assert!(format!("{err:#}").contains("mapping"), "{err:#}");
    }
}
