//! # Error Types: Validation Error Taxonomy
//!
//! Defines the error types surfaced to the user at build time. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Every user-facing error identifies the peripheral instance
//!   (e.g. `ethernet_spi` or `binary_sensor[0]`) and the offending field path
//!   (e.g. `manual_ip.static_ip`).
//! - Errors are never retried. The first error aborts the configuration pass.
//! - Primitive coercers and validated constructors report [`CoercionError`],
//!   which carries no location. The schema validator attaches the location
//!   with [`ValidationError::at`].

use thiserror::Error;

use crate::platform::PinMode;

/// A build-time configuration validation failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required key is absent.
    #[error("[{instance}] required field '{field}' is missing")]
    MissingField {
        /// Peripheral instance path.
        instance: String,
        /// Field path within the instance.
        field: String,
    },

    /// A value is present but cannot be coerced to its declared type or range.
    #[error("[{instance}] invalid value for '{field}': {reason}")]
    TypeCoercion {
        /// Peripheral instance path.
        instance: String,
        /// Field path within the instance.
        field: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// Two mutually exclusive components are selected in the same build.
    #[error("component '{first}' cannot be used together with '{second}'")]
    Conflict {
        /// The component declaring the exclusion.
        first: String,
        /// The conflicting component.
        second: String,
    },

    /// A pin was requested for a direction it cannot serve on the target.
    #[error("[{instance}] pin GPIO{pin} cannot be used as {mode} for '{field}': {reason}")]
    Capability {
        /// Peripheral instance path.
        instance: String,
        /// Field path within the instance.
        field: String,
        /// GPIO number.
        pin: u8,
        /// Requested direction.
        mode: PinMode,
        /// Why the pin was rejected.
        reason: String,
    },

    /// A key that the schema does not declare.
    #[error("[{instance}] unknown field '{field}'")]
    UnknownField {
        /// Peripheral instance path.
        instance: String,
        /// Field path within the instance.
        field: String,
    },

    /// A component requires another component that is not declared.
    #[error("component '{component}' requires component '{requires}'")]
    MissingDependency {
        /// The dependent component.
        component: String,
        /// The missing dependency.
        requires: String,
    },

    /// A component is not available on the selected platform or framework.
    #[error("component '{component}' is not supported here: {reason}")]
    UnsupportedPlatform {
        /// The component domain.
        component: String,
        /// Platform or framework restriction that was violated.
        reason: String,
    },

    /// A referenced object id is not declared, is ambiguous, or has the wrong class.
    #[error("[{instance}] cannot resolve '{field}' = '{id}': {reason}")]
    UnresolvedReference {
        /// Peripheral instance path.
        instance: String,
        /// Field path within the instance.
        field: String,
        /// The id that failed to resolve (empty when none could be inferred).
        id: String,
        /// Why the reference failed.
        reason: String,
    },

    /// Two objects declare the same id.
    #[error("id '{id}' is declared by both [{first}] and [{second}]")]
    DuplicateId {
        /// The duplicated id.
        id: String,
        /// Instance that declared it first.
        first: String,
        /// Instance that declared it again.
        second: String,
    },
}

impl ValidationError {
    /// Attach an instance and field location to a [`CoercionError`].
    pub fn at(instance: &str, field: &str, err: CoercionError) -> Self {
        match err {
            CoercionError::Invalid(reason) => Self::TypeCoercion {
                instance: instance.to_string(),
                field: field.to_string(),
                reason,
            },
            CoercionError::Capability { pin, mode, reason } => Self::Capability {
                instance: instance.to_string(),
                field: field.to_string(),
                pin,
                mode,
                reason,
            },
        }
    }

    /// Short machine-readable name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::TypeCoercion { .. } => "type_coercion",
            Self::Conflict { .. } => "conflict",
            Self::Capability { .. } => "capability",
            Self::UnknownField { .. } => "unknown_field",
            Self::MissingDependency { .. } => "missing_dependency",
            Self::UnsupportedPlatform { .. } => "unsupported_platform",
            Self::UnresolvedReference { .. } => "unresolved_reference",
            Self::DuplicateId { .. } => "duplicate_id",
        }
    }
}

/// Failure of a single coercion rule, before a location is attached.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoercionError {
    /// The raw value is not valid for the expected type or range.
    #[error("{0}")]
    Invalid(String),

    /// The pin exists but cannot serve the requested direction.
    #[error("GPIO{pin} cannot be used as {mode}: {reason}")]
    Capability {
        /// GPIO number.
        pin: u8,
        /// Requested direction.
        mode: PinMode,
        /// Why the pin was rejected.
        reason: String,
    },
}

impl CoercionError {
    /// Convenience constructor for [`CoercionError::Invalid`].
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_maps_invalid_to_type_coercion() {
        let err = ValidationError::at("ethernet_spi", "clock_speed", CoercionError::invalid("too big"));
        assert_eq!(
            err,
            ValidationError::TypeCoercion {
                instance: "ethernet_spi".into(),
                field: "clock_speed".into(),
                reason: "too big".into(),
            }
        );
        assert_eq!(err.kind(), "type_coercion");
    }

    #[test]
    fn at_maps_capability() {
        let err = ValidationError::at(
            "ethernet_spi",
            "clk_pin",
            CoercionError::Capability {
                pin: 34,
                mode: PinMode::Output,
                reason: "input-only".into(),
            },
        );
        assert_eq!(err.kind(), "capability");
        assert_eq!(
            err.to_string(),
            "[ethernet_spi] pin GPIO34 cannot be used as output for 'clk_pin': input-only"
        );
    }

    #[test]
    fn conflict_names_both_components() {
        let err = ValidationError::Conflict {
            first: "ethernet_spi".into(),
            second: "wifi".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ethernet_spi"));
        assert!(msg.contains("wifi"));
    }
}
