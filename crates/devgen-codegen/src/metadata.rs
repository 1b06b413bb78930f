//! # Build Metadata Accumulator
//!
//! [`BuildMetadata`] collects everything emission declares besides setup
//! statements: compile-time defines, raw build flags, ESP-IDF sdkconfig
//! options, native library dependencies and auto-loaded components.
//!
//! ## Invariant
//!
//! The accumulator is append-only and idempotent. Declaring the same item
//! twice leaves one occurrence. All collections are ordered, so rendering
//! depends only on the set of declarations, never on their order.
//!
//! A re-declaration with a different value (another library version, another
//! sdkconfig value) keeps the first value and logs a warning.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

/// Value of an sdkconfig option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SdkconfigValue {
    /// `y` / not set.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Quoted string value.
    Str(String),
}

impl fmt::Display for SdkconfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("y"),
            Self::Bool(false) => f.write_str("n"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
        }
    }
}

/// Per-build accumulator of non-code outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildMetadata {
    defines: BTreeSet<String>,
    build_flags: BTreeSet<String>,
    sdkconfig: BTreeMap<String, SdkconfigValue>,
    libraries: BTreeMap<String, String>,
    auto_load: BTreeSet<String>,
}

impl BuildMetadata {
    /// An empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a preprocessor define.
    pub fn add_define(&mut self, name: impl Into<String>) {
        self.defines.insert(name.into());
    }

    /// Declare a raw compiler flag.
    pub fn add_build_flag(&mut self, flag: impl Into<String>) {
        self.build_flags.insert(flag.into());
    }

    /// Declare an ESP-IDF sdkconfig option.
    pub fn add_sdkconfig(&mut self, name: impl Into<String>, value: SdkconfigValue) {
        let name = name.into();
        match self.sdkconfig.get(&name) {
            Some(existing) if *existing != value => {
                tracing::warn!(
                    option = %name,
                    kept = %existing,
                    ignored = %value,
                    "conflicting sdkconfig value, keeping the first declaration"
                );
            }
            Some(_) => {}
            None => {
                self.sdkconfig.insert(name, value);
            }
        }
    }

    /// Declare a native library dependency.
    pub fn add_library(&mut self, name: impl Into<String>, version: impl Into<String>) {
        let name = name.into();
        let version = version.into();
        match self.libraries.get(&name) {
            Some(existing) if *existing != version => {
                tracing::warn!(
                    library = %name,
                    kept = %existing,
                    ignored = %version,
                    "conflicting library version, keeping the first declaration"
                );
            }
            Some(_) => {}
            None => {
                self.libraries.insert(name, version);
            }
        }
    }

    /// Record that a component domain is pulled in implicitly.
    pub fn add_auto_load(&mut self, domain: impl Into<String>) {
        self.auto_load.insert(domain.into());
    }

    /// Declared defines, sorted.
    pub fn defines(&self) -> impl Iterator<Item = &str> {
        self.defines.iter().map(String::as_str)
    }

    /// Declared build flags, sorted.
    pub fn build_flags(&self) -> impl Iterator<Item = &str> {
        self.build_flags.iter().map(String::as_str)
    }

    /// Declared sdkconfig options, sorted by name.
    pub fn sdkconfig(&self) -> impl Iterator<Item = (&str, &SdkconfigValue)> {
        self.sdkconfig.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Declared libraries as `(name, version)`, sorted by name.
    pub fn libraries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.libraries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Auto-loaded domains, sorted.
    pub fn auto_load(&self) -> impl Iterator<Item = &str> {
        self.auto_load.iter().map(String::as_str)
    }

    /// Whether a define has been declared.
    pub fn has_define(&self, name: &str) -> bool {
        self.defines.contains(name)
    }

    /// Render `defines.h`.
    pub fn render_defines(&self) -> String {
        let mut out = String::from("#pragma once\n");
        for define in &self.defines {
            out.push_str(&format!("#define {define}\n"));
        }
        out
    }

    /// Render `sdkconfig.defaults`. Disabled booleans use the
    /// `# CONFIG_X is not set` form.
    pub fn render_sdkconfig(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.sdkconfig {
            match value {
                SdkconfigValue::Bool(false) => out.push_str(&format!("# {name} is not set\n")),
                other => out.push_str(&format!("{name}={other}\n")),
            }
        }
        out
    }
}
