//! # Typed Configuration Values
//!
//! [`ConfigEntry`] is the validated, fully typed form of one peripheral
//! instance's configuration. It is produced by the schema validator and
//! consumed by code emission.
//!
//! Entries are keyed by field name. Emission never iterates an entry
//! directly; it walks the schema in declaration order and looks fields up,
//! so the map ordering has no influence on generated output.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use serde::Serialize;

use crate::identity::ObjectId;
use crate::platform::Pin;
use crate::temporal::TimePeriod;

/// An enumeration tag after case normalization, with the native constant it maps to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EnumChoice {
    /// Normalized tag as written in configuration (e.g. `W5500`).
    pub tag: String,
    /// Native constant emitted for this tag (e.g. `ethernet_spi::ETHERNET_TYPE_W5500`).
    pub native: &'static str,
}

/// A single validated configuration value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Range-checked integer.
    Int(i64),
    /// Floating-point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Free-form string.
    String(String),
    /// GPIO reference with its requested direction.
    Pin(Pin),
    /// IPv4 address. `0.0.0.0` is the "unspecified" sentinel.
    Ipv4(Ipv4Addr),
    /// Time period.
    Duration(TimePeriod),
    /// Enumeration choice.
    Enum(EnumChoice),
    /// Declared or referenced object id.
    Id(ObjectId),
    /// Nested sub-entry.
    Entry(ConfigEntry),
}

impl ConfigValue {
    /// Short name of the value's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Pin(_) => "pin",
            Self::Ipv4(_) => "ipv4",
            Self::Duration(_) => "duration",
            Self::Enum(_) => "enum",
            Self::Id(_) => "id",
            Self::Entry(_) => "entry",
        }
    }
}

/// A validated configuration entry for one peripheral instance (or a nested bundle).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigEntry {
    fields: BTreeMap<String, ConfigValue>,
}

impl ConfigEntry {
    /// Create an empty entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.fields.insert(key.into(), value);
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.fields.get(key)
    }

    /// Whether a field is present.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the entry has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Integer field, if present with that type.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(ConfigValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Boolean field, if present with that type.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key) {
            Some(ConfigValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// String field, if present with that type.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(ConfigValue::String(v)) => Some(v),
            _ => None,
        }
    }

    /// Pin field, if present with that type.
    pub fn get_pin(&self, key: &str) -> Option<Pin> {
        match self.get(key) {
            Some(ConfigValue::Pin(v)) => Some(*v),
            _ => None,
        }
    }

    /// IPv4 field, if present with that type.
    pub fn get_ipv4(&self, key: &str) -> Option<Ipv4Addr> {
        match self.get(key) {
            Some(ConfigValue::Ipv4(v)) => Some(*v),
            _ => None,
        }
    }

    /// Duration field, if present with that type.
    pub fn get_duration(&self, key: &str) -> Option<TimePeriod> {
        match self.get(key) {
            Some(ConfigValue::Duration(v)) => Some(*v),
            _ => None,
        }
    }

    /// Enumeration field, if present with that type.
    pub fn get_enum(&self, key: &str) -> Option<&EnumChoice> {
        match self.get(key) {
            Some(ConfigValue::Enum(v)) => Some(v),
            _ => None,
        }
    }

    /// Object id field, if present with that type.
    pub fn get_id(&self, key: &str) -> Option<&ObjectId> {
        match self.get(key) {
            Some(ConfigValue::Id(v)) => Some(v),
            _ => None,
        }
    }

    /// Nested entry field, if present with that type.
    pub fn get_entry(&self, key: &str) -> Option<&ConfigEntry> {
        match self.get(key) {
            Some(ConfigValue::Entry(v)) => Some(v),
            _ => None,
        }
    }
}
