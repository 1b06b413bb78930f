//! # Primitive Coercers
//!
//! Each function maps one raw configuration value (`serde_json::Value`) to a
//! typed value, or fails with a [`CoercionError`] that describes what was
//! expected. The functions know nothing about field names or instances; the
//! validator attaches that context.
//!
//! Numeric strings are accepted wherever a number is expected, since YAML
//! users frequently quote numbers.

use std::net::Ipv4Addr;

use devgen_core::{CoercionError, EnumChoice, Pin, PinMode, Platform, TimePeriod};
use serde_json::Value;

use crate::schema::{EnumCase, EnumOption};

/// Maximum length of one label in a domain name.
const MAX_DOMAIN_LABEL_LEN: usize = 63;

/// Short description of a raw value for error messages.
pub fn describe(raw: &Value) -> String {
    match raw {
        Value::Null => "null".into(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(_) => "a list".into(),
        Value::Object(_) => "a mapping".into(),
    }
}

/// Integer within `min..=max`.
pub fn int_range(raw: &Value, min: i64, max: i64) -> Result<i64, CoercionError> {
    let value = match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .ok_or_else(|| CoercionError::invalid(format!("expected an integer, got number {n}")))?,
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| {
            CoercionError::invalid(format!("expected an integer, got string {s:?}"))
        })?,
        other => {
            return Err(CoercionError::invalid(format!(
                "expected an integer, got {}",
                describe(other)
            )))
        }
    };
    if value < min || value > max {
        return Err(CoercionError::invalid(format!(
            "value {value} is outside the range [{min}, {max}]"
        )));
    }
    Ok(value)
}

/// Any finite floating-point number.
pub fn float(raw: &Value) -> Result<f64, CoercionError> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    value
        .filter(|f| f.is_finite())
        .ok_or_else(|| CoercionError::invalid(format!("expected a number, got {}", describe(raw))))
}

/// Boolean, accepting common spellings.
pub fn boolean(raw: &Value) -> Result<bool, CoercionError> {
    match raw {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "enable" => Ok(true),
            "false" | "no" | "off" | "disable" => Ok(false),
            _ => Err(CoercionError::invalid(format!(
                "expected a boolean (true/false, yes/no, on/off, enable/disable), got string {s:?}"
            ))),
        },
        other => Err(CoercionError::invalid(format!(
            "expected a boolean, got {}",
            describe(other)
        ))),
    }
}

/// Scalar converted to a string. Booleans and collections are rejected.
pub fn string(raw: &Value) -> Result<String, CoercionError> {
    match raw {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(_) => Err(CoercionError::invalid(
            "value was parsed as a boolean, wrap it in quotes to use it as a string",
        )),
        other => Err(CoercionError::invalid(format!(
            "expected a string, got {}",
            describe(other)
        ))),
    }
}

/// Must already be a string.
pub fn string_strict(raw: &Value) -> Result<String, CoercionError> {
    match raw {
        Value::String(s) => Ok(s.clone()),
        other => Err(CoercionError::invalid(format!(
            "expected a string, got {}, wrap the value in quotes",
            describe(other)
        ))),
    }
}

/// Dotted-quad IPv4 address.
pub fn ipv4(raw: &Value) -> Result<Ipv4Addr, CoercionError> {
    let s = string_strict(raw)?;
    s.trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| CoercionError::invalid(format!("{s:?} is not a valid IPv4 address")))
}

/// Duration literal. A bare numeric zero is accepted.
pub fn time_period(raw: &Value) -> Result<TimePeriod, CoercionError> {
    match raw {
        Value::String(s) => TimePeriod::parse(s),
        Value::Number(n) if n.as_f64() == Some(0.0) => Ok(TimePeriod::ZERO),
        Value::Number(n) => Err(CoercionError::invalid(format!(
            "time period {n} has no unit, did you mean '{n}s'?"
        ))),
        other => Err(CoercionError::invalid(format!(
            "expected a time period, got {}",
            describe(other)
        ))),
    }
}

/// One of a fixed set of tags, after case normalization.
pub fn enum_choice(
    raw: &Value,
    options: &[EnumOption],
    case: EnumCase,
) -> Result<EnumChoice, CoercionError> {
    let s = string(raw)?;
    let normalized = match case {
        EnumCase::Exact => s.clone(),
        EnumCase::Upper => s.to_ascii_uppercase(),
        EnumCase::Lower => s.to_ascii_lowercase(),
    };
    options
        .iter()
        .find(|o| o.tag == normalized)
        .map(|o| EnumChoice {
            tag: o.tag.to_string(),
            native: o.native,
        })
        .ok_or_else(|| {
            let tags: Vec<&str> = options.iter().map(|o| o.tag).collect();
            CoercionError::invalid(format!(
                "unknown value {s:?}, valid options are: {}",
                tags.join(", ")
            ))
        })
}

/// Domain suffix: empty, or a single leading `.` followed by labels.
pub fn domain_name(raw: &Value) -> Result<String, CoercionError> {
    let s = string_strict(raw)?;
    if s.is_empty() {
        return Ok(s);
    }
    let Some(rest) = s.strip_prefix('.') else {
        return Err(CoercionError::invalid(format!("domain {s:?} must start with '.'")));
    };
    if rest.starts_with('.') {
        return Err(CoercionError::invalid(format!(
            "domain {s:?} must start with a single '.'"
        )));
    }
    for label in rest.split('.') {
        if label.is_empty() || label.len() > MAX_DOMAIN_LABEL_LEN {
            return Err(CoercionError::invalid(format!(
                "domain {s:?} has a label that is empty or longer than {MAX_DOMAIN_LABEL_LEN} characters"
            )));
        }
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(CoercionError::invalid(format!(
                "domain {s:?} may only contain letters, digits, '-' and '.'"
            )));
        }
    }
    Ok(s)
}

/// Icon reference of the form `namespace:name`, or empty.
pub fn icon(raw: &Value) -> Result<String, CoercionError> {
    let s = string(raw)?;
    if s.is_empty() {
        return Ok(s);
    }
    let valid_part = |p: &str| {
        !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    };
    match s.split_once(':') {
        Some((ns, name)) if valid_part(ns) && valid_part(name) => Ok(s),
        _ => Err(CoercionError::invalid(format!(
            "icon {s:?} must be in the form 'namespace:icon-name', e.g. 'mdi:usb'"
        ))),
    }
}

/// GPIO number usable in `mode` on `platform`.
///
/// Accepts an integer, a numeric string, or `GPIO<n>` in any case.
pub fn pin(raw: &Value, platform: Platform, mode: PinMode) -> Result<Pin, CoercionError> {
    let number = match raw {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| CoercionError::invalid(format!("expected a GPIO number, got number {n}")))?,
        Value::String(s) => {
            let trimmed = s.trim();
            let digits = trimmed
                .get(..4)
                .filter(|prefix| prefix.eq_ignore_ascii_case("gpio"))
                .map_or(trimmed, |_| &trimmed[4..]);
            digits.parse::<i64>().map_err(|_| {
                CoercionError::invalid(format!("expected a GPIO number, got string {s:?}"))
            })?
        }
        other => {
            return Err(CoercionError::invalid(format!(
                "expected a GPIO number, got {}",
                describe(other)
            )))
        }
    };
    Pin::new(platform, number, mode)
}
