//! # MAX3421E entity platforms
//!
//! `binary_sensor.max3421e` reports whether a USB device is attached.
//! `text_sensor.max3421e` reports the attached device's descriptor summary.
//!
//! Each platform entry allocates one entity, registers it with the
//! application, and links it to its parent controller. The parent is named
//! by `max3421e_id`, or inferred when exactly one controller is declared.

use devgen_codegen::{
    emit_fields, expect_id, new_descriptor, EmitContext, Expr, Registration, RegistrationError,
};
use devgen_core::ConfigEntry;
use devgen_schema::{Coercion, ComponentConstraints, DefaultValue, FieldSpec, Schema};

use crate::common::ENTITY_FIELDS;
use crate::max3421e;

/// Binary sensor entity class.
pub const BINARY_SENSOR_CLASS: &str = "binary_sensor::BinarySensor";
/// Text sensor entity class.
pub const TEXT_SENSOR_CLASS: &str = "text_sensor::TextSensor";

const BINARY_ID: &[FieldSpec] = &[FieldSpec::declare_id("id", BINARY_SENSOR_CLASS)];
const BINARY_FIELDS: &[FieldSpec] = &[
    FieldSpec::defaulted("icon", Coercion::Icon, DefaultValue::Str("mdi:usb-port")).setter("set_icon"),
    FieldSpec::defaulted("device_class", Coercion::String, DefaultValue::Str("plug"))
        .setter("set_device_class"),
];

/// The `device_connected` entity.
pub const DEVICE_CONNECTED_SCHEMA: Schema =
    Schema::new("device_connected", &[BINARY_ID, ENTITY_FIELDS, BINARY_FIELDS]);

const TEXT_ID: &[FieldSpec] = &[FieldSpec::declare_id("id", TEXT_SENSOR_CLASS)];
const TEXT_FIELDS: &[FieldSpec] =
    &[FieldSpec::defaulted("icon", Coercion::Icon, DefaultValue::Str("mdi:usb")).setter("set_icon")];

/// The `device_info` entity.
pub const DEVICE_INFO_SCHEMA: Schema = Schema::new("device_info", &[TEXT_ID, ENTITY_FIELDS, TEXT_FIELDS]);

const BINARY_PLATFORM_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("platform", Coercion::StringStrict),
    FieldSpec::use_id(max3421e::PARENT_KEY, max3421e::CLASS),
    FieldSpec::required("device_connected", Coercion::Nested(&DEVICE_CONNECTED_SCHEMA)),
];

/// `binary_sensor` platform entry schema.
///
/// `device_connected` is required here, though the firmware's own config
/// layer accepts an entry without it. Such an entry would allocate no object,
/// so it is rejected with `MissingField` instead of being silently dropped.
pub const BINARY_SENSOR_SCHEMA: Schema =
    Schema::new("binary_sensor.max3421e", &[BINARY_PLATFORM_FIELDS]);

const TEXT_PLATFORM_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("platform", Coercion::StringStrict),
    FieldSpec::use_id(max3421e::PARENT_KEY, max3421e::CLASS),
    FieldSpec::required("device_info", Coercion::Nested(&DEVICE_INFO_SCHEMA)),
];

/// `text_sensor` platform entry schema.
///
/// `device_info` is required for the same reason as `device_connected` on
/// [`BINARY_SENSOR_SCHEMA`].
pub const TEXT_SENSOR_SCHEMA: Schema = Schema::new("text_sensor.max3421e", &[TEXT_PLATFORM_FIELDS]);

/// Constraints of the binary sensor platform.
pub const BINARY_SENSOR_CONSTRAINTS: ComponentConstraints = ComponentConstraints {
    domain: "binary_sensor.max3421e",
    conflicts_with: &[],
    dependencies: &["max3421e", "binary_sensor"],
    platforms: &[],
    framework: None,
    multi_conf: true,
};

/// Constraints of the text sensor platform.
pub const TEXT_SENSOR_CONSTRAINTS: ComponentConstraints = ComponentConstraints {
    domain: "text_sensor.max3421e",
    conflicts_with: &[],
    dependencies: &["max3421e", "text_sensor"],
    platforms: &[],
    framework: None,
    multi_conf: true,
};

/// Emit a `device_connected` binary sensor and link it to its controller.
pub fn emit_binary_sensor(
    entry: &ConfigEntry,
    ctx: &mut EmitContext<'_>,
) -> Result<(), RegistrationError> {
    emit_entity(
        entry,
        ctx,
        EntityLink {
            key: "device_connected",
            schema: &DEVICE_CONNECTED_SCHEMA,
            registration: Registration::BinarySensor,
            link_method: "set_device_connected_sensor",
            define: "USE_BINARY_SENSOR",
        },
    )
}

/// Emit a `device_info` text sensor and link it to its controller.
pub fn emit_text_sensor(
    entry: &ConfigEntry,
    ctx: &mut EmitContext<'_>,
) -> Result<(), RegistrationError> {
    emit_entity(
        entry,
        ctx,
        EntityLink {
            key: "device_info",
            schema: &DEVICE_INFO_SCHEMA,
            registration: Registration::TextSensor,
            link_method: "set_device_info_sensor",
            define: "USE_TEXT_SENSOR",
        },
    )
}

struct EntityLink {
    key: &'static str,
    schema: &'static Schema,
    registration: Registration,
    link_method: &'static str,
    define: &'static str,
}

fn emit_entity(
    entry: &ConfigEntry,
    ctx: &mut EmitContext<'_>,
    link: EntityLink,
) -> Result<(), RegistrationError> {
    let parent = expect_id(entry, max3421e::PARENT_KEY, link.schema.name).clone();
    let Some(entity) = entry.get_entry(link.key) else {
        panic!("validated platform entry lacks '{}'", link.key);
    };

    let mut descriptor = new_descriptor(link.schema, entity, link.registration);
    emit_fields(&mut descriptor, link.schema, entity);
    let own = Expr::Var(descriptor.id().clone());
    descriptor.call_on(parent, link.link_method, vec![own]);

    ctx.metadata.add_define(link.define);
    ctx.register(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use devgen_codegen::{Application, BuildMetadata};
    use devgen_core::{DeviceName, Framework, Platform, Target, ValidationError};
    use devgen_schema::{validate_entry, ValidationContext};
    use serde_json::json;

    fn context_with_parent() -> ValidationContext {
        let mut ctx = ValidationContext::new(
            Target {
                platform: Platform::Esp32,
                framework: Framework::Arduino,
            },
            DeviceName::parse("desk").unwrap(),
        );
        validate_entry(&max3421e::SCHEMA, &json!({"id": "usb"}), "max3421e", &mut ctx).unwrap();
        ctx
    }

    #[test]
    fn binary_sensor_defaults_and_link() {
        let mut vctx = context_with_parent();
        let entry = validate_entry(
            &BINARY_SENSOR_SCHEMA,
            &json!({"platform": "max3421e", "device_connected": {"name": "USB connected"}}),
            "binary_sensor[0]",
            &mut vctx,
        )
        .unwrap();

        let mut meta = BuildMetadata::new();
        let mut app = Application::new(DeviceName::parse("desk").unwrap());
        let mut usb = devgen_codegen::PeripheralDescriptor::new(
            devgen_core::ObjectId::parse("usb").unwrap(),
            max3421e::CLASS,
            Registration::Component,
        );
        usb.set("set_debug", Expr::Bool(false));
        {
            let mut ctx = EmitContext::new(&mut meta, &mut app);
            ctx.register(usb).unwrap();
            emit_binary_sensor(&entry, &mut ctx).unwrap();
        }

        assert_eq!(
            app.descriptors()[1].render(),
            "binarysensor_id = new binary_sensor::BinarySensor();\n\
             App.register_binary_sensor(binarysensor_id);\n\
             binarysensor_id->set_name(\"USB connected\");\n\
             binarysensor_id->set_disabled_by_default(false);\n\
             binarysensor_id->set_entity_category(ENTITY_CATEGORY_DIAGNOSTIC);\n\
             binarysensor_id->set_internal(false);\n\
             binarysensor_id->set_icon(\"mdi:usb-port\");\n\
             binarysensor_id->set_device_class(\"plug\");\n\
             usb->set_device_connected_sensor(binarysensor_id);\n"
        );
        assert!(meta.has_define("USE_BINARY_SENSOR"));
    }

    #[test]
    fn text_sensor_icon_default() {
        let mut vctx = context_with_parent();
        let entry = validate_entry(
            &TEXT_SENSOR_SCHEMA,
            &json!({"platform": "max3421e", "max3421e_id": "usb", "device_info": {"name": "USB device"}}),
            "text_sensor[0]",
            &mut vctx,
        )
        .unwrap();
        let info = entry.get_entry("device_info").unwrap();
        assert_eq!(info.get_str("icon"), Some("mdi:usb"));
        assert!(info.get("device_class").is_none());
    }

    #[test]
    fn entity_requires_name() {
        let err = validate_entry(
            &TEXT_SENSOR_SCHEMA,
            &json!({"platform": "max3421e", "device_info": {}}),
            "text_sensor[0]",
            &mut context_with_parent(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingField {
                instance: "text_sensor[0]".into(),
                field: "device_info.name".into()
            }
        );
    }

    #[test]
    fn entity_sub_mapping_required() {
        let err = validate_entry(
            &BINARY_SENSOR_SCHEMA,
            &json!({"platform": "max3421e"}),
            "binary_sensor[0]",
            &mut context_with_parent(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "missing_field");
    }

    #[test]
    fn entity_category_normalized() {
        let entry = validate_entry(
            &BINARY_SENSOR_SCHEMA,
            &json!({"platform": "max3421e", "device_connected": {"name": "x", "entity_category": "CONFIG"}}),
            "binary_sensor[0]",
            &mut context_with_parent(),
        )
        .unwrap();
        let entity = entry.get_entry("device_connected").unwrap();
        assert_eq!(entity.get_enum("entity_category").map(|e| e.native), Some("ENTITY_CATEGORY_CONFIG"));
    }
}
