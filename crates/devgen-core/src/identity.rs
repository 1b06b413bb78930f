//! # Identity Newtypes
//!
//! Newtype wrappers for the names that end up in generated code: object ids
//! (C++ variable names) and the device name (network hostname).
//!
//! Both are validated at construction. Code emission can therefore splice
//! them into generated source without further escaping.

use std::fmt;

use serde::Serialize;

use crate::error::CoercionError;

/// Maximum length of a device hostname.
pub const MAX_DEVICE_NAME_LEN: usize = 31;

/// Words that cannot be used as generated variable names.
const RESERVED_IDS: &[&str] = &[
    "App", "auto", "bool", "break", "case", "char", "class", "const", "continue", "default",
    "delete", "do", "double", "else", "enum", "extern", "false", "float", "for", "if", "int",
    "long", "namespace", "new", "nullptr", "private", "protected", "public", "return", "short",
    "static", "struct", "switch", "template", "this", "true", "typedef", "union", "unsigned",
    "void", "volatile", "while",
];

/// Identifier of an emitted native object.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ObjectId(String);

impl ObjectId {
    /// Validate a user-supplied id.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError::Invalid`] unless `s` is a C++ identifier
    /// that is not a reserved word.
    pub fn parse(s: &str) -> Result<Self, CoercionError> {
        let mut chars = s.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(CoercionError::invalid(format!(
                "id {s:?} must start with a letter or '_' and contain only letters, digits and '_'"
            )));
        }
        if RESERVED_IDS.contains(&s) {
            return Err(CoercionError::invalid(format!("id {s:?} is a reserved word")));
        }
        Ok(Self(s.to_string()))
    }

    /// Build the `n`-th generated id for a native class.
    ///
    /// `ethernet_spi::EthernetComponent` yields `ethernetcomponent_id` for
    /// `n == 1` and `ethernetcomponent_id_<n>` afterwards.
    pub fn generated(class: &str, n: usize) -> Self {
        let base = class.rsplit("::").next().unwrap_or(class).to_ascii_lowercase();
        if n <= 1 {
            Self(format!("{base}_id"))
        } else {
            Self(format!("{base}_id_{n}"))
        }
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The device hostname, used for address derivation and logging.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceName(String);

impl DeviceName {
    /// Validate a device name.
    ///
    /// # Errors
    ///
    /// Returns [`CoercionError::Invalid`] unless the name is 1 to 31
    /// characters of lowercase letters, digits, `-` and `_`, not starting or
    /// ending with `-`. Underscores are not valid in DNS labels, so a name
    /// using them resolves over mDNS only on some hosts.
    pub fn parse(s: &str) -> Result<Self, CoercionError> {
        if s.is_empty() || s.len() > MAX_DEVICE_NAME_LEN {
            return Err(CoercionError::invalid(format!(
                "device name {s:?} must be 1 to {MAX_DEVICE_NAME_LEN} characters"
            )));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(CoercionError::invalid(format!(
                "device name {s:?} may only contain lowercase letters, digits, '-' and '_'"
            )));
        }
        if s.starts_with('-') || s.ends_with('-') {
            return Err(CoercionError::invalid(format!(
                "device name {s:?} cannot start or end with '-'"
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Access the name string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
