//! # Entry Validation
//!
//! Turns untrusted nested configuration into a fully typed, defaulted
//! [`ConfigEntry`], or fails with a [`ValidationError`] before any code is
//! emitted.
//!
//! ## Passes
//!
//! 1. Reject keys the schema does not declare.
//! 2. Walk the schema in declaration order: coerce present values, report
//!    missing required keys, inject defaults, generate or infer ids.
//! 3. Run the schema's cross-field rules over the coerced entry.
//!
//! The first failure aborts. Validation has no side effects outside the
//! [`ValidationContext`], which records the object ids declared so far so
//! that later entries can reference them.
//!
//! Generated ids never take a name some other entry declares explicitly.
//! Call [`ValidationContext::reserve_ids`] on every entry of a document
//! before validating any of them.

use std::collections::{BTreeMap, BTreeSet};

use devgen_core::{ConfigEntry, ConfigValue, DeviceName, ObjectId, Target, ValidationError};
use serde_json::{Map, Value};

use crate::coerce;
use crate::schema::{Coercion, FieldSpec, Presence, RuleContext, Schema};

/// An object id recorded during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredId {
    /// Native class of the object.
    pub class: &'static str,
    /// Instance path that declared it.
    pub instance: String,
}

/// Build-wide state shared by every entry validated in one build.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    target: Target,
    device_name: DeviceName,
    declared: BTreeMap<ObjectId, DeclaredId>,
    reserved: BTreeSet<ObjectId>,
}

impl ValidationContext {
    /// Start validating a build for `target` on a device called `device_name`.
    pub fn new(target: Target, device_name: DeviceName) -> Self {
        Self {
            target,
            device_name,
            declared: BTreeMap::new(),
            reserved: BTreeSet::new(),
        }
    }

    /// The build target.
    pub fn target(&self) -> Target {
        self.target
    }

    /// The device hostname.
    pub fn device_name(&self) -> &DeviceName {
        &self.device_name
    }

    /// All ids declared so far, sorted.
    pub fn declared_ids(&self) -> impl Iterator<Item = (&ObjectId, &DeclaredId)> {
        self.declared.iter()
    }

    /// Record a declared id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateId`] if the id is already taken.
    pub fn declare(
        &mut self,
        id: ObjectId,
        class: &'static str,
        instance: &str,
    ) -> Result<(), ValidationError> {
        if let Some(existing) = self.declared.get(&id) {
            return Err(ValidationError::DuplicateId {
                id: id.to_string(),
                first: existing.instance.clone(),
                second: instance.to_string(),
            });
        }
        self.declared.insert(
            id,
            DeclaredId {
                class,
                instance: instance.to_string(),
            },
        );
        Ok(())
    }

    /// Reserve every id `raw` declares explicitly under `schema`, nested
    /// mappings included, so that [`generate_id`](Self::generate_id) skips them.
    ///
    /// Malformed values are ignored here; validation reports them.
    pub fn reserve_ids(&mut self, schema: &Schema, raw: &Value) {
        let Value::Object(map) = raw else {
            return;
        };
        for spec in schema.fields() {
            match (spec.coercion, map.get(spec.key)) {
                (Coercion::DeclareId { .. }, Some(value)) => {
                    if let Ok(id) = parse_id(value) {
                        self.reserved.insert(id);
                    }
                }
                (Coercion::Nested(inner), Some(value)) => self.reserve_ids(inner, value),
                _ => {}
            }
        }
    }

    /// Generate and record the next free id for `class`.
    pub fn generate_id(&mut self, class: &'static str, instance: &str) -> ObjectId {
        let id = (1..)
            .map(|n| ObjectId::generated(class, n))
            .find(|candidate| {
                !self.declared.contains_key(candidate) && !self.reserved.contains(candidate)
            })
            .unwrap_or_else(|| ObjectId::generated(class, usize::MAX));
        self.declared.insert(
            id.clone(),
            DeclaredId {
                class,
                instance: instance.to_string(),
            },
        );
        id
    }

    /// Check that `id` was declared with `class`.
    fn resolve(
        &self,
        id: ObjectId,
        class: &'static str,
        instance: &str,
        field: &str,
    ) -> Result<ObjectId, ValidationError> {
        match self.declared.get(&id) {
            Some(declared) if declared.class == class => Ok(id),
            Some(declared) => Err(ValidationError::UnresolvedReference {
                instance: instance.to_string(),
                field: field.to_string(),
                id: id.to_string(),
                reason: format!("declared as {} but {class} is required", declared.class),
            }),
            None => Err(ValidationError::UnresolvedReference {
                instance: instance.to_string(),
                field: field.to_string(),
                id: id.to_string(),
                reason: format!("no {class} with this id is declared"),
            }),
        }
    }

    /// Pick the single declared object of `class`.
    fn infer(
        &self,
        class: &'static str,
        instance: &str,
        field: &str,
    ) -> Result<ObjectId, ValidationError> {
        let mut candidates = self
            .declared
            .iter()
            .filter(|(_, d)| d.class == class)
            .map(|(id, _)| id);
        match (candidates.next(), candidates.next()) {
            (Some(id), None) => Ok(id.clone()),
            (None, _) => Err(ValidationError::UnresolvedReference {
                instance: instance.to_string(),
                field: field.to_string(),
                id: String::new(),
                reason: format!("no {class} is declared"),
            }),
            (Some(_), Some(_)) => Err(ValidationError::UnresolvedReference {
                instance: instance.to_string(),
                field: field.to_string(),
                id: String::new(),
                reason: format!("several {class} objects are declared, set '{field}' explicitly"),
            }),
        }
    }
}

/// Validate one peripheral instance against `schema`.
///
/// `instance` names the instance in error messages (`ethernet_spi`,
/// `binary_sensor[0]`). A `null` raw value is treated as an empty mapping.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found, in schema declaration order.
pub fn validate_entry(
    schema: &Schema,
    raw: &Value,
    instance: &str,
    ctx: &mut ValidationContext,
) -> Result<ConfigEntry, ValidationError> {
    let entry = validate_mapping(schema, raw, instance, "", ctx)?;
    tracing::trace!(instance, schema = schema.name, fields = entry.len(), "entry validated");
    Ok(entry)
}

fn validate_mapping(
    schema: &Schema,
    raw: &Value,
    instance: &str,
    prefix: &str,
    ctx: &mut ValidationContext,
) -> Result<ConfigEntry, ValidationError> {
    let empty = Map::new();
    let map = match raw {
        Value::Object(map) => map,
        Value::Null => &empty,
        other => {
            return Err(ValidationError::TypeCoercion {
                instance: instance.to_string(),
                field: display_path(prefix),
                reason: format!("expected a mapping, got {}", coerce::describe(other)),
            })
        }
    };

    if let Some(unknown) = map.keys().find(|key| schema.field(key).is_none()) {
        return Err(ValidationError::UnknownField {
            instance: instance.to_string(),
            field: join_path(prefix, unknown),
        });
    }

    let mut entry = ConfigEntry::new();
    for spec in schema.fields() {
        let path = join_path(prefix, spec.key);
        let supplied = match map.get(spec.key) {
            Some(Value::Null) if !matches!(spec.coercion, Coercion::Nested(_)) => None,
            other => other,
        };

        let value = match supplied {
            Some(raw_value) => Some(coerce_field(spec, raw_value, instance, &path, ctx)?),
            None => match spec.presence {
                Presence::Required => {
                    return Err(ValidationError::MissingField {
                        instance: instance.to_string(),
                        field: path,
                    })
                }
                Presence::Optional => None,
                Presence::Defaulted(default) => {
                    Some(coerce_field(spec, &default.to_raw(), instance, &path, ctx)?)
                }
                Presence::Generated => Some(generate_field(spec, instance, &path, ctx)?),
            },
        };

        if let Some(value) = value {
            entry.insert(spec.key, value);
        }
    }

    let rule_ctx = RuleContext {
        instance,
        device_name: &ctx.device_name,
        target: ctx.target,
    };
    for rule in schema.rules {
        (rule.apply)(&mut entry, &rule_ctx)?;
        tracing::trace!(instance, rule = rule.name, "cross-field rule applied");
    }

    Ok(entry)
}

fn coerce_field(
    spec: &FieldSpec,
    raw: &Value,
    instance: &str,
    path: &str,
    ctx: &mut ValidationContext,
) -> Result<ConfigValue, ValidationError> {
    let at = |e| ValidationError::at(instance, path, e);
    let value = match spec.coercion {
        Coercion::IntRange { min, max } => ConfigValue::Int(coerce::int_range(raw, min, max).map_err(at)?),
        Coercion::Float => ConfigValue::Float(coerce::float(raw).map_err(at)?),
        Coercion::Boolean => ConfigValue::Bool(coerce::boolean(raw).map_err(at)?),
        Coercion::String => ConfigValue::String(coerce::string(raw).map_err(at)?),
        Coercion::StringStrict => ConfigValue::String(coerce::string_strict(raw).map_err(at)?),
        Coercion::Ipv4 => ConfigValue::Ipv4(coerce::ipv4(raw).map_err(at)?),
        Coercion::TimePeriod => ConfigValue::Duration(coerce::time_period(raw).map_err(at)?),
        Coercion::Enum { options, case } => {
            ConfigValue::Enum(coerce::enum_choice(raw, options, case).map_err(at)?)
        }
        Coercion::DomainName => ConfigValue::String(coerce::domain_name(raw).map_err(at)?),
        Coercion::Icon => ConfigValue::String(coerce::icon(raw).map_err(at)?),
        Coercion::Pin(mode) => {
            ConfigValue::Pin(coerce::pin(raw, ctx.target.platform, mode).map_err(at)?)
        }
        Coercion::DeclareId { class } => {
            let id = parse_id(raw).map_err(at)?;
            ctx.declare(id.clone(), class, instance)?;
            ConfigValue::Id(id)
        }
        Coercion::UseId { class } => {
            let id = parse_id(raw).map_err(at)?;
            ConfigValue::Id(ctx.resolve(id, class, instance, path)?)
        }
        Coercion::Nested(schema) => {
            ConfigValue::Entry(validate_mapping(schema, raw, instance, path, ctx)?)
        }
    };
    Ok(value)
}

fn generate_field(
    spec: &FieldSpec,
    instance: &str,
    path: &str,
    ctx: &mut ValidationContext,
) -> Result<ConfigValue, ValidationError> {
    match spec.coercion {
        Coercion::DeclareId { class } => Ok(ConfigValue::Id(ctx.generate_id(class, instance))),
        Coercion::UseId { class } => Ok(ConfigValue::Id(ctx.infer(class, instance, path)?)),
        _ => Err(ValidationError::MissingField {
            instance: instance.to_string(),
            field: path.to_string(),
        }),
    }
}

fn parse_id(raw: &Value) -> Result<ObjectId, devgen_core::CoercionError> {
    ObjectId::parse(&coerce::string_strict(raw)?)
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn display_path(prefix: &str) -> String {
    if prefix.is_empty() {
        "(root)".to_string()
    } else {
        prefix.to_string()
    }
}
