//! # Build Driver
//!
//! Runs one build document through the whole pipeline:
//!
//! 1. Parse the `device` section into a [`DeviceConfig`].
//! 2. Collect instances: known component domains, entity platform entries,
//!    and foreign domains (kept only for constraint checks).
//! 3. Order instances by descending kind priority, stable in document order.
//! 4. Check each present kind's constraints.
//! 5. Reserve explicitly declared ids, then validate every instance. The
//!    first error aborts the build.
//! 6. Emit every instance into one [`Application`] and [`BuildMetadata`].
//!
//! Steps 1–5 are [`validate_document`]; step 6 is [`ValidatedBuild::emit`].
//! Nothing is emitted unless the whole document validates.

use std::collections::BTreeSet;

use devgen_codegen::{Application, BuildMetadata, EmitContext, RegistrationError};
use devgen_core::{
    CoercionError, ConfigEntry, DeviceName, Framework, Platform, Target, ValidationError,
};
use devgen_schema::{
    check_constraints, coerce, load_yaml, validate_entry, DocumentError, ValidationContext,
};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::kind::PeripheralKind;

/// Top-level key of the device section.
pub const DEVICE_KEY: &str = "device";

/// Errors raised by a build.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The document text could not be loaded.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The configuration is invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An emitted object could not be registered.
    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

/// The parsed `device` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceConfig {
    /// Device hostname.
    pub name: DeviceName,
    /// Build target.
    #[serde(flatten)]
    pub target: Target,
}

/// One peripheral instance after validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedInstance {
    /// Instance path (`ethernet_spi`, `binary_sensor[1]`).
    pub instance: String,
    /// Peripheral kind.
    pub kind: PeripheralKind,
    /// Validated entry.
    pub entry: ConfigEntry,
}

/// A fully validated document, ready for emission.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedBuild {
    /// Device section.
    pub device: DeviceConfig,
    /// Instances in emission order.
    pub instances: Vec<ValidatedInstance>,
    /// Foreign domains present in the document, sorted.
    pub foreign: Vec<String>,
}

/// The result of a successful build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildOutput {
    /// Device section.
    pub device: DeviceConfig,
    /// Registered objects.
    pub application: Application,
    /// Accumulated build metadata.
    pub metadata: BuildMetadata,
}

impl BuildOutput {
    /// `main.cpp` contents.
    pub fn main_cpp(&self) -> String {
        self.application.render_main()
    }

    /// `defines.h` contents.
    pub fn defines_h(&self) -> String {
        self.metadata.render_defines()
    }

    /// `sdkconfig.defaults` contents.
    pub fn sdkconfig_defaults(&self) -> String {
        self.metadata.render_sdkconfig()
    }

    /// `build.json` manifest: device, metadata, and registered object ids.
    pub fn manifest(&self) -> Value {
        let objects: Vec<Value> = self
            .application
            .descriptors()
            .iter()
            .map(|d| {
                serde_json::json!({
                    "id": d.id(),
                    "class": d.class(),
                    "registration": d.registration(),
                })
            })
            .collect();
        serde_json::json!({
            "device": self.device,
            "objects": objects,
            "metadata": self.metadata,
        })
    }
}

/// Load YAML text and build it.
///
/// # Errors
///
/// Returns the first [`BuildError`] encountered.
pub fn build_yaml(text: &str) -> Result<BuildOutput, BuildError> {
    let doc = load_yaml(text)?;
    build_document(&doc)
}

/// Validate and emit a document.
///
/// # Errors
///
/// Returns the first [`BuildError`] encountered.
pub fn build_document(doc: &Value) -> Result<BuildOutput, BuildError> {
    validate_document(doc)?.emit()
}

struct PendingInstance<'d> {
    instance: String,
    kind: PeripheralKind,
    raw: &'d Value,
}

/// Validate a whole document without emitting anything.
///
/// # Errors
///
/// Returns the first [`ValidationError`] in build order, or a
/// [`DocumentError`] if the document is not a mapping.
pub fn validate_document(doc: &Value) -> Result<ValidatedBuild, BuildError> {
    let Value::Object(top) = doc else {
        return Err(DocumentError::NotAMapping.into());
    };

    let device = parse_device(top.get(DEVICE_KEY))?;
    tracing::info!(
        device = %device.name,
        platform = %device.target.platform,
        framework = %device.target.framework,
        "validating build"
    );

    let mut pending = Vec::new();
    let mut foreign = Vec::new();
    let mut declared: BTreeSet<String> = BTreeSet::new();
    declared.insert(device.target.platform.as_str().to_string());

    for (domain, value) in top.iter().filter(|(k, _)| k.as_str() != DEVICE_KEY) {
        declared.insert(domain.clone());
        if PeripheralKind::is_entity_domain(domain) {
            collect_entities(domain, value, &mut pending)?;
        } else if let Some(kind) = PeripheralKind::component(domain) {
            collect_component(domain, kind, value, &mut pending)?;
        } else {
            tracing::debug!(domain = %domain, "foreign domain");
            foreign.push(domain.clone());
        }
    }

    // Stable: document order is kept within a priority.
    pending.sort_by_key(|p| std::cmp::Reverse(p.kind.spec().priority));

    let mut checked = BTreeSet::new();
    for p in &pending {
        if checked.insert(p.kind) {
            check_constraints(p.kind.spec().constraints, &declared, device.target)?;
        }
    }

    let mut ctx = ValidationContext::new(device.target, device.name.clone());
    for p in &pending {
        ctx.reserve_ids(p.kind.spec().schema, p.raw);
    }
    let mut instances = Vec::with_capacity(pending.len());
    for p in pending {
        let entry = validate_entry(p.kind.spec().schema, p.raw, &p.instance, &mut ctx)?;
        instances.push(ValidatedInstance {
            instance: p.instance,
            kind: p.kind,
            entry,
        });
    }

    Ok(ValidatedBuild {
        device,
        instances,
        foreign,
    })
}

impl ValidatedBuild {
    /// Emit every instance in order.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Registration`] if an object cannot be registered.
    pub fn emit(self) -> Result<BuildOutput, BuildError> {
        let mut metadata = BuildMetadata::new();
        let mut application = Application::new(self.device.name.clone());
        {
            let mut ctx = EmitContext::new(&mut metadata, &mut application);
            for instance in &self.instances {
                (instance.kind.spec().emit)(&instance.entry, &mut ctx)?;
                tracing::debug!(instance = %instance.instance, kind = instance.kind.name(), "emitted");
            }
        }
        tracing::info!(objects = application.len(), "build emitted");
        Ok(BuildOutput {
            device: self.device,
            application,
            metadata,
        })
    }
}

fn collect_component<'d>(
    domain: &str,
    kind: PeripheralKind,
    value: &'d Value,
    pending: &mut Vec<PendingInstance<'d>>,
) -> Result<(), ValidationError> {
    match value {
        Value::Array(items) if kind.spec().constraints.multi_conf => {
            for (i, raw) in items.iter().enumerate() {
                pending.push(PendingInstance {
                    instance: format!("{domain}[{i}]"),
                    kind,
                    raw,
                });
            }
        }
        Value::Array(_) => {
            return Err(ValidationError::TypeCoercion {
                instance: domain.to_string(),
                field: "(root)".to_string(),
                reason: "this component accepts a single instance, not a list".to_string(),
            })
        }
        raw => pending.push(PendingInstance {
            instance: domain.to_string(),
            kind,
            raw,
        }),
    }
    Ok(())
}

fn collect_entities<'d>(
    domain: &str,
    value: &'d Value,
    pending: &mut Vec<PendingInstance<'d>>,
) -> Result<(), ValidationError> {
    let items: &[Value] = match value {
        Value::Array(items) => items,
        Value::Null => &[],
        single => std::slice::from_ref(single),
    };
    for (i, raw) in items.iter().enumerate() {
        let instance = format!("{domain}[{i}]");
        let platform = match raw.get("platform") {
            Some(p) => coerce::string_strict(p)
                .map_err(|e| ValidationError::at(&instance, "platform", e))?,
            None => {
                return Err(ValidationError::MissingField {
                    instance,
                    field: "platform".to_string(),
                })
            }
        };
        match PeripheralKind::entity_platform(domain, &platform) {
            Some(kind) => pending.push(PendingInstance {
                instance,
                kind,
                raw,
            }),
            None => tracing::debug!(instance = %instance, %platform, "foreign entity platform"),
        }
    }
    Ok(())
}

fn device_field(field: &'static str) -> impl Fn(CoercionError) -> ValidationError {
    move |e| ValidationError::at(DEVICE_KEY, field, e)
}

/// Parse the `device` section.
///
/// # Errors
///
/// - [`ValidationError::MissingField`] if the section or a required key is absent.
/// - [`ValidationError::UnknownField`] for undeclared keys.
/// - [`ValidationError::TypeCoercion`] for invalid values.
pub fn parse_device(raw: Option<&Value>) -> Result<DeviceConfig, ValidationError> {
    let empty = Map::new();
    let section = match raw {
        Some(Value::Object(map)) => map,
        Some(Value::Null) => &empty,
        Some(other) => {
            return Err(ValidationError::TypeCoercion {
                instance: DEVICE_KEY.to_string(),
                field: "(root)".to_string(),
                reason: format!("expected a mapping, got {}", coerce::describe(other)),
            })
        }
        None => {
            return Err(ValidationError::MissingField {
                instance: "(root)".to_string(),
                field: DEVICE_KEY.to_string(),
            })
        }
    };

    const KEYS: [&str; 3] = ["name", "platform", "framework"];
    if let Some(unknown) = section.keys().find(|k| !KEYS.contains(&k.as_str())) {
        return Err(ValidationError::UnknownField {
            instance: DEVICE_KEY.to_string(),
            field: unknown.clone(),
        });
    }

    let required = |field: &'static str| {
        section
            .get(field)
            .filter(|v| !v.is_null())
            .ok_or_else(|| ValidationError::MissingField {
                instance: DEVICE_KEY.to_string(),
                field: field.to_string(),
            })
    };

    let name = coerce::string_strict(required("name")?)
        .and_then(|s| DeviceName::parse(&s))
        .map_err(device_field("name"))?;
    let platform: Platform = coerce::string_strict(required("platform")?)
        .and_then(|s| s.parse())
        .map_err(device_field("platform"))?;
    let framework: Framework = match section.get("framework").filter(|v| !v.is_null()) {
        Some(v) => coerce::string_strict(v)
            .and_then(|s| s.parse())
            .map_err(device_field("framework"))?,
        None => Framework::default(),
    };

    Ok(DeviceConfig {
        name,
        target: Target {
            platform,
            framework,
        },
    })
}
