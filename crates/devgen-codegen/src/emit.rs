//! # Schema-Driven Emission
//!
//! Helpers that turn a validated [`ConfigEntry`] into setter calls by walking
//! its [`Schema`] in declaration order. Component emission functions call
//! [`emit_fields`] for the uniform part and add their own special cases
//! (links to parents, build metadata) around it.
//!
//! Emission trusts validation. A field the schema guarantees but the entry
//! lacks, or a value of an unexpected shape, is a defect in this program and
//! panics.

use devgen_core::{ConfigEntry, ConfigValue, ObjectId};
use devgen_schema::{Coercion, FieldSpec, Schema};

use crate::descriptor::PeripheralDescriptor;
use crate::expr::{Expr, Registration};
use crate::metadata::BuildMetadata;
use crate::registry::{ComponentRegistry, RegistrationError};

/// Mutable state threaded through every emission call of one build.
pub struct EmitContext<'a> {
    /// Build metadata accumulator.
    pub metadata: &'a mut BuildMetadata,
    /// Registry receiving finished descriptors.
    pub registry: &'a mut dyn ComponentRegistry,
}

impl<'a> EmitContext<'a> {
    /// Bundle the accumulator and the registry.
    pub fn new(metadata: &'a mut BuildMetadata, registry: &'a mut dyn ComponentRegistry) -> Self {
        Self { metadata, registry }
    }

    /// Hand a finished descriptor to the registry.
    ///
    /// # Errors
    ///
    /// Propagates the registry's [`RegistrationError`].
    pub fn register(&mut self, descriptor: PeripheralDescriptor) -> Result<(), RegistrationError> {
        self.registry.register(descriptor)
    }
}

/// Allocate the descriptor for an entry whose schema declares an id.
///
/// # Panics
///
/// If the schema declares no id field or the entry carries no id.
pub fn new_descriptor(
    schema: &Schema,
    entry: &ConfigEntry,
    registration: Registration,
) -> PeripheralDescriptor {
    let (Some(field), Some(class)) = (schema.id_field(), schema.declared_class()) else {
        panic!("schema '{}' declares no object id", schema.name);
    };
    let id = expect_id(entry, field.key, schema.name);
    PeripheralDescriptor::new(id.clone(), class, registration)
}

/// Emit one setter call per schema field that has a setter and a value.
///
/// Fields are visited in declaration order. Absent optional fields are
/// skipped; the native object keeps its own disabled state for them.
///
/// # Panics
///
/// If a field that validation guarantees is missing from `entry`.
pub fn emit_fields(descriptor: &mut PeripheralDescriptor, schema: &Schema, entry: &ConfigEntry) {
    for field in schema.fields() {
        let Some(setter) = field.setter else {
            continue;
        };
        match entry.get(field.key) {
            Some(value) => descriptor.set(setter, value_to_expr(value, field)),
            None => assert!(
                !field.always_present(),
                "validated entry for '{}' lacks guaranteed field '{}'",
                schema.name,
                field.key
            ),
        }
    }
}

/// The native expression for one validated value.
///
/// Durations become whole milliseconds. Pins become their GPIO number.
/// Nested entries become struct initializers of the nested schema's native type.
///
/// # Panics
///
/// If a nested entry's schema has no native struct type.
pub fn value_to_expr(value: &ConfigValue, field: &FieldSpec) -> Expr {
    match value {
        ConfigValue::Int(v) => Expr::Int(*v),
        ConfigValue::Float(v) => Expr::Float(*v),
        ConfigValue::Bool(v) => Expr::Bool(*v),
        ConfigValue::String(s) => Expr::Str(s.clone()),
        ConfigValue::Pin(pin) => Expr::Int(i64::from(pin.number())),
        ConfigValue::Ipv4(ip) => Expr::IpAddress(*ip),
        ConfigValue::Duration(period) => {
            Expr::Int(i64::try_from(period.total_milliseconds()).unwrap_or(i64::MAX))
        }
        ConfigValue::Enum(choice) => Expr::Constant(choice.native.to_string()),
        ConfigValue::Id(id) => Expr::Var(id.clone()),
        ConfigValue::Entry(nested) => match field.coercion {
            Coercion::Nested(schema) => struct_init(schema, nested),
            _ => panic!("field '{}' holds a nested entry but is not nested", field.key),
        },
    }
}

/// A designated initializer for a nested entry, fields in schema order.
///
/// # Panics
///
/// If the schema has no native struct type.
pub fn struct_init(schema: &Schema, entry: &ConfigEntry) -> Expr {
    let Some(ty) = schema.native_struct else {
        panic!("nested schema '{}' has no native struct type", schema.name);
    };
    let fields = schema
        .fields()
        .filter_map(|field| {
            entry
                .get(field.key)
                .map(|value| (field.key.to_string(), value_to_expr(value, field)))
        })
        .collect();
    Expr::StructInit {
        ty: ty.to_string(),
        fields,
    }
}

/// The object id stored under `key`.
///
/// # Panics
///
/// If the entry has no id there.
pub fn expect_id<'e>(entry: &'e ConfigEntry, key: &str, schema: &str) -> &'e ObjectId {
    match entry.get_id(key) {
        Some(id) => id,
        None => panic!("validated entry for '{schema}' has no id under '{key}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Application;
    use devgen_core::{DeviceName, Framework, PinMode, Platform, Target};
    use devgen_schema::{validate_entry, DefaultValue, ValidationContext};
    use serde_json::json;

    const ADDR_FIELDS: &[FieldSpec] = &[
        FieldSpec::required("static_ip", Coercion::Ipv4),
        FieldSpec::defaulted("dns1", Coercion::Ipv4, DefaultValue::Str("0.0.0.0")),
    ];
    const ADDR: Schema = Schema::new("addr", &[ADDR_FIELDS]).native_struct("demo::Addr");

    const FIELDS: &[FieldSpec] = &[
        FieldSpec::declare_id("id", "demo::DemoComponent"),
        FieldSpec::required("cs_pin", Coercion::Pin(PinMode::Output)).setter("set_cs_pin"),
        FieldSpec::optional("reset_pin", Coercion::Pin(PinMode::Output)).setter("set_reset_pin"),
        FieldSpec::defaulted("interval", Coercion::TimePeriod, DefaultValue::Str("1.5s"))
            .setter("set_interval"),
        FieldSpec::defaulted("tag", Coercion::String, DefaultValue::Str("x")),
        FieldSpec::optional("addr", Coercion::Nested(&ADDR)).setter("set_addr"),
    ];
    const DEMO: Schema = Schema::new("demo", &[FIELDS]);

    fn validated(raw: serde_json::Value) -> ConfigEntry {
        let mut ctx = ValidationContext::new(
            Target {
                platform: Platform::Esp32,
                framework: Framework::EspIdf,
            },
            DeviceName::parse("dev").unwrap(),
        );
        validate_entry(&DEMO, &raw, "demo", &mut ctx).unwrap()
    }

    #[test]
    fn setters_follow_declaration_order() {
        let entry = validated(json!({"addr": {"static_ip": "10.0.0.2"}, "cs_pin": 5}));
        let mut desc = new_descriptor(&DEMO, &entry, Registration::Component);
        emit_fields(&mut desc, &DEMO, &entry);
        let methods: Vec<_> = desc.calls().iter().map(|c| c.method.as_str()).collect();
        assert_eq!(methods, ["set_cs_pin", "set_interval", "set_addr"]);
        assert_eq!(desc.calls()[1].args, vec![Expr::Int(1500)]);
        assert_eq!(desc.id().as_str(), "democomponent_id");
    }

    #[test]
    fn absent_optional_has_no_setter() {
        let entry = validated(json!({"cs_pin": 5}));
        let mut desc = new_descriptor(&DEMO, &entry, Registration::Component);
        emit_fields(&mut desc, &DEMO, &entry);
        assert!(!desc.has_call("set_reset_pin"));
        assert!(!desc.has_call("set_addr"));
    }

    #[test]
    fn nested_becomes_struct_init_with_defaults() {
        let entry = validated(json!({"cs_pin": 5, "addr": {"static_ip": "10.0.0.2"}}));
        let mut desc = new_descriptor(&DEMO, &entry, Registration::Component);
        emit_fields(&mut desc, &DEMO, &entry);
        let rendered = desc.render();
        assert!(rendered.contains(
            "democomponent_id->set_addr(demo::Addr{\n  .static_ip = network::IPAddress(10, 0, 0, 2),\n  .dns1 = network::IPAddress(0, 0, 0, 0),\n});"
        ), "{rendered}");
    }

    #[test]
    #[should_panic(expected = "lacks guaranteed field 'cs_pin'")]
    fn missing_guaranteed_field_panics() {
        let mut entry = ConfigEntry::new();
        entry.insert("id", ConfigValue::Id(ObjectId::parse("x").unwrap()));
        let mut desc = new_descriptor(&DEMO, &entry, Registration::Component);
        emit_fields(&mut desc, &DEMO, &entry);
    }

    #[test]
    fn emission_is_byte_identical() {
        let entry = validated(json!({"cs_pin": 5, "reset_pin": 4}));
        let render = || {
            let mut desc = new_descriptor(&DEMO, &entry, Registration::Component);
            emit_fields(&mut desc, &DEMO, &entry);
            desc.render()
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn context_registers() {
        let mut meta = BuildMetadata::new();
        let mut app = Application::new(DeviceName::parse("dev").unwrap());
        let entry = validated(json!({"cs_pin": 5}));
        {
            let mut ctx = EmitContext::new(&mut meta, &mut app);
            ctx.metadata.add_define("USE_DEMO");
            ctx.register(new_descriptor(&DEMO, &entry, Registration::Component))
                .unwrap();
        }
        assert_eq!(app.len(), 1);
        assert!(meta.has_define("USE_DEMO"));
    }
}
