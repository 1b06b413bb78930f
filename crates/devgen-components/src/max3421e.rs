//! # `max3421e`: USB host controller over SPI
//!
//! Built on the USB Host Shield library. `debug_usb_lib` has no setter; it
//! switches the library's own debug output on through build flags.

use devgen_codegen::{emit_fields, new_descriptor, EmitContext, Registration, RegistrationError};
use devgen_core::ConfigEntry;
use devgen_schema::{Coercion, ComponentConstraints, DefaultValue, FieldSpec, Schema};

use crate::common::COMPONENT_FIELDS;

/// Native component class.
pub const CLASS: &str = "max3421e::MAX3421EComponent";

/// Key under which entity platforms reference their parent.
pub const PARENT_KEY: &str = "max3421e_id";

/// Library dependencies as `(name, version)`.
pub const LIBRARIES: &[(&str, &str)] = &[("SPI", "~2.0.0"), ("felis/USB-Host-Shield-20", "~1.6.0")];

const USB_LIB_DEBUG_FLAGS: &[&str] = &["-D DEBUG_USB_HOST=1", "-D ENABLE_UHS_DEBUGGING=1"];

const FIELDS: &[FieldSpec] = &[
    FieldSpec::declare_id("id", CLASS),
    FieldSpec::defaulted("report_status_interval", Coercion::TimePeriod, DefaultValue::Str("0s"))
        .setter("set_report_status_interval"),
    FieldSpec::defaulted("debug", Coercion::Boolean, DefaultValue::Bool(false)).setter("set_debug"),
    FieldSpec::defaulted("debug_verbose", Coercion::Boolean, DefaultValue::Bool(false))
        .setter("set_debug_verbose"),
    FieldSpec::defaulted("debug_usb_lib", Coercion::Boolean, DefaultValue::Bool(false)),
];

/// Configuration schema.
pub const SCHEMA: Schema = Schema::new("max3421e", &[FIELDS, COMPONENT_FIELDS]);

/// Build-level constraints.
pub const CONSTRAINTS: ComponentConstraints = ComponentConstraints::unconstrained("max3421e");

/// Emit the controller, its setters, libraries and optional debug flags.
pub fn emit(entry: &ConfigEntry, ctx: &mut EmitContext<'_>) -> Result<(), RegistrationError> {
    let mut descriptor = new_descriptor(&SCHEMA, entry, Registration::Component);
    emit_fields(&mut descriptor, &SCHEMA, entry);

    if entry.get_bool("debug_usb_lib") == Some(true) {
        for flag in USB_LIB_DEBUG_FLAGS {
            ctx.metadata.add_build_flag(*flag);
        }
    }
    for (name, version) in LIBRARIES {
        ctx.metadata.add_library(*name, *version);
    }

    ctx.register(descriptor)
}
