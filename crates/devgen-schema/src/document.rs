//! # Document Loading
//!
//! Build documents are written in YAML and validated as a
//! [`serde_json::Value`] tree. This module performs the conversion and
//! rejects YAML constructs that have no JSON equivalent.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Errors raised while loading a build document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The text is not well-formed YAML.
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A tagged value such as `!secret name`.
    #[error("at {path}: tag {tag} is not supported")]
    UnsupportedTag {
        /// Dotted path of the value.
        path: String,
        /// The tag as written.
        tag: String,
    },

    /// A mapping key that is a sequence, mapping, null or tagged value.
    #[error("at {path}: mapping keys must be scalars")]
    UnsupportedKey {
        /// Dotted path of the mapping.
        path: String,
    },

    /// A float JSON cannot hold (`.nan`, `.inf`).
    #[error("at {path}: {value} is not a finite number")]
    NonFiniteNumber {
        /// Dotted path of the value.
        path: String,
        /// The number as parsed.
        value: f64,
    },

    /// The top level of the document is not a mapping.
    #[error("build document must be a mapping at the top level")]
    NotAMapping,
}

/// Parse YAML text into a JSON value tree.
///
/// # Errors
///
/// Returns [`DocumentError`] on malformed YAML, on tagged values, on
/// non-scalar mapping keys, on non-finite floats, or if the top level is not
/// a mapping.
pub fn load_yaml(text: &str) -> Result<Value, DocumentError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text)?;
    let value = yaml_to_json_value(&yaml)?;
    if !value.is_object() {
        return Err(DocumentError::NotAMapping);
    }
    Ok(value)
}

/// Convert a `serde_yaml::Value` tree to a `serde_json::Value` tree.
///
/// Scalar keys (strings, numbers, booleans) become strings. Errors name the
/// dotted path of the offending value, `(root)` for the top level.
///
/// # Errors
///
/// See [`load_yaml`]; everything but `Yaml` and `NotAMapping` can occur.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, DocumentError> {
    convert(yaml, "")
}

fn convert(yaml: &serde_yaml::Value, path: &str) -> Result<Value, DocumentError> {
    use serde_yaml::Value as Yaml;

    Ok(match yaml {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Number(n) => number(n, path)?,
        Yaml::Sequence(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, item)| convert(item, &format!("{}[{i}]", located(path))))
                .collect::<Result<_, _>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = scalar_key(key).ok_or_else(|| DocumentError::UnsupportedKey {
                    path: located(path),
                })?;
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                object.insert(key, convert(value, &child)?);
            }
            Value::Object(object)
        }
        Yaml::Tagged(tagged) => {
            return Err(DocumentError::UnsupportedTag {
                path: located(path),
                tag: tagged.tag.to_string(),
            })
        }
    })
}

fn number(n: &serde_yaml::Number, path: &str) -> Result<Value, DocumentError> {
    if let Some(i) = n.as_i64() {
        return Ok(Value::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Ok(Value::from(u));
    }
    let f = n.as_f64().unwrap_or(f64::NAN);
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| DocumentError::NonFiniteNumber {
            path: located(path),
            value: f,
        })
}

fn scalar_key(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn located(path: &str) -> String {
    if path.is_empty() {
        "(root)".to_string()
    } else {
        path.to_string()
    }
}
