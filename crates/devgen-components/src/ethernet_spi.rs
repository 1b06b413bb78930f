//! # `ethernet_spi`: SPI-attached W5500 Ethernet MAC
//!
//! ESP-IDF only. Replaces Wi-Fi as the network transport, so it conflicts
//! with `wifi` and the RMII `ethernet` component.
//!
//! ## Address derivation
//!
//! After field coercion, `use_address` is filled when not given:
//!
//! 1. explicit `use_address` is kept unchanged;
//! 2. else the `manual_ip.static_ip` address in dotted-quad form;
//! 3. else the device name followed by `domain`.

use devgen_codegen::{
    emit_fields, new_descriptor, EmitContext, Registration, RegistrationError, SdkconfigValue,
};
use devgen_core::{ConfigEntry, ConfigValue, Framework, PinMode, Platform, ValidationError};
use devgen_schema::{
    Coercion, ComponentConstraints, CrossFieldRule, DefaultValue, EnumCase, EnumOption, FieldSpec,
    RuleContext, Schema,
};

use crate::common::COMPONENT_FIELDS;

/// Native component class.
pub const CLASS: &str = "ethernet_spi::EthernetComponent";

const TYPES: &[EnumOption] = &[EnumOption {
    tag: "W5500",
    native: "ethernet_spi::ETHERNET_TYPE_W5500",
}];

const MANUAL_IP_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("static_ip", Coercion::Ipv4),
    FieldSpec::required("gateway", Coercion::Ipv4),
    FieldSpec::required("subnet", Coercion::Ipv4),
    FieldSpec::defaulted("dns1", Coercion::Ipv4, DefaultValue::Str("0.0.0.0")),
    FieldSpec::defaulted("dns2", Coercion::Ipv4, DefaultValue::Str("0.0.0.0")),
];

/// Static addressing bundle, emitted as an `ethernet_spi::ManualIP` initializer.
pub const MANUAL_IP_SCHEMA: Schema =
    Schema::new("manual_ip", &[MANUAL_IP_FIELDS]).native_struct("ethernet_spi::ManualIP");

const FIELDS: &[FieldSpec] = &[
    FieldSpec::declare_id("id", CLASS),
    FieldSpec::required(
        "type",
        Coercion::Enum {
            options: TYPES,
            case: EnumCase::Upper,
        },
    )
    .setter("set_type"),
    FieldSpec::required("clk_pin", Coercion::Pin(PinMode::Output)).setter("set_clk_pin"),
    FieldSpec::required("miso_pin", Coercion::Pin(PinMode::Input)).setter("set_miso_pin"),
    FieldSpec::required("mosi_pin", Coercion::Pin(PinMode::Output)).setter("set_mosi_pin"),
    FieldSpec::required("cs_pin", Coercion::Pin(PinMode::Output)).setter("set_cs_pin"),
    FieldSpec::required("interrupt_pin", Coercion::Pin(PinMode::Input))
        .setter("set_interrupt_pin"),
    FieldSpec::optional("reset_pin", Coercion::Pin(PinMode::Output)).setter("set_reset_pin"),
    // W5500 is rated up to 33.3 MHz.
    FieldSpec::defaulted("clock_speed", Coercion::IntRange { min: 1, max: 80 }, DefaultValue::Int(30))
        .setter("set_clock_speed"),
    FieldSpec::defaulted("domain", Coercion::DomainName, DefaultValue::Str(".local")),
    FieldSpec::optional("use_address", Coercion::StringStrict).setter("set_use_address"),
    FieldSpec::optional("manual_ip", Coercion::Nested(&MANUAL_IP_SCHEMA)).setter("set_manual_ip"),
];

const RULES: &[CrossFieldRule] = &[CrossFieldRule {
    name: "derive_use_address",
    apply: derive_use_address,
}];

/// Configuration schema.
pub const SCHEMA: Schema = Schema::new("ethernet_spi", &[FIELDS, COMPONENT_FIELDS]).with_rules(RULES);

/// Build-level constraints.
pub const CONSTRAINTS: ComponentConstraints = ComponentConstraints {
    domain: "ethernet_spi",
    conflicts_with: &["wifi", "ethernet"],
    dependencies: &["esp32"],
    platforms: &[Platform::Esp32],
    framework: Some(Framework::EspIdf),
    multi_conf: false,
};

/// Domains pulled in implicitly.
pub const AUTO_LOAD: &[&str] = &["network"];

/// Fill `use_address` from `manual_ip` or the device name when absent.
pub fn derive_use_address(
    entry: &mut ConfigEntry,
    ctx: &RuleContext<'_>,
) -> Result<(), ValidationError> {
    if entry.contains("use_address") {
        return Ok(());
    }
    let address = match entry
        .get_entry("manual_ip")
        .and_then(|manual| manual.get_ipv4("static_ip"))
    {
        Some(static_ip) => static_ip.to_string(),
        None => {
            let domain = entry.get_str("domain").unwrap_or_default();
            format!("{}{domain}", ctx.device_name)
        }
    };
    tracing::debug!(instance = ctx.instance, %address, "derived use_address");
    entry.insert("use_address", ConfigValue::String(address));
    Ok(())
}

/// Emit the component, its setters and its build metadata.
pub fn emit(entry: &ConfigEntry, ctx: &mut EmitContext<'_>) -> Result<(), RegistrationError> {
    let mut descriptor = new_descriptor(&SCHEMA, entry, Registration::Component);
    emit_fields(&mut descriptor, &SCHEMA, entry);

    ctx.metadata.add_define("USE_ETHERNET_SPI");
    ctx.metadata
        .add_sdkconfig("CONFIG_ETH_USE_SPI_ETHERNET", SdkconfigValue::Bool(true));
    ctx.metadata
        .add_sdkconfig("CONFIG_ETH_SPI_ETHERNET_W5500", SdkconfigValue::Bool(true));
    for domain in AUTO_LOAD {
        ctx.metadata.add_auto_load(*domain);
    }

    ctx.register(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use devgen_codegen::{Application, BuildMetadata, ComponentRegistry};
    use devgen_core::{DeviceName, ObjectId, Target};
    use devgen_schema::{validate_entry, ValidationContext};
    use serde_json::{json, Value};

    fn context(name: &str) -> ValidationContext {
        ValidationContext::new(
            Target {
                platform: Platform::Esp32,
                framework: Framework::EspIdf,
            },
            DeviceName::parse(name).unwrap(),
        )
    }

    fn base() -> serde_json::Map<String, Value> {
        let Value::Object(map) = json!({
            "type": "w5500",
            "clk_pin": 18,
            "miso_pin": 19,
            "mosi_pin": 23,
            "cs_pin": 5,
            "interrupt_pin": 4,
        }) else {
            unreachable!()
        };
        map
    }

    fn validate(extra: Value) -> Result<ConfigEntry, ValidationError> {
        let mut raw = base();
        if let Value::Object(extra) = extra {
            raw.extend(extra);
        }
        validate_entry(&SCHEMA, &Value::Object(raw), "ethernet_spi", &mut context("livingroom"))
    }

    #[test]
    fn use_address_from_device_name() {
        let entry = validate(json!({})).unwrap();
        assert_eq!(entry.get_str("use_address"), Some("livingroom.local"));
    }

    #[test]
    fn use_address_from_custom_domain() {
        let entry = validate(json!({"domain": ".lan"})).unwrap();
        assert_eq!(entry.get_str("use_address"), Some("livingroom.lan"));
    }

    #[test]
    fn use_address_from_manual_ip() {
        let entry = validate(json!({"manual_ip": {
            "static_ip": "192.168.1.50", "gateway": "192.168.1.1", "subnet": "255.255.255.0"
        }}))
        .unwrap();
        assert_eq!(entry.get_str("use_address"), Some("192.168.1.50"));
    }

    #[test]
    fn explicit_use_address_wins() {
        let entry = validate(json!({
            "use_address": "custom.host",
            "manual_ip": {"static_ip": "192.168.1.50", "gateway": "192.168.1.1", "subnet": "255.255.255.0"}
        }))
        .unwrap();
        assert_eq!(entry.get_str("use_address"), Some("custom.host"));
    }

    #[test]
    fn input_only_pin_rejected_for_clk() {
        let err = validate(json!({"clk_pin": 35})).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::Capability { ref field, pin: 35, mode: PinMode::Output, .. } if field == "clk_pin"
        ));
    }

    #[test]
    fn input_only_pin_accepted_for_miso() {
        let entry = validate(json!({"miso_pin": 35})).unwrap();
        assert_eq!(entry.get_pin("miso_pin").map(|p| p.number()), Some(35));
    }

    #[test]
    fn clock_speed_bounds() {
        assert!(validate(json!({"clock_speed": 81})).is_err());
        assert_eq!(validate(json!({})).unwrap().get_int("clock_speed"), Some(30));
    }

    #[test]
    fn unknown_type_rejected() {
        let err = validate(json!({"type": "ENC28J60"})).unwrap_err();
        assert_eq!(err.kind(), "type_coercion");
    }

    #[test]
    fn emits_setters_in_declaration_order() {
        let entry = validate(json!({"id": "eth", "reset_pin": 26})).unwrap();
        let mut meta = BuildMetadata::new();
        let mut app = Application::new(DeviceName::parse("livingroom").unwrap());
        emit(&entry, &mut EmitContext::new(&mut meta, &mut app)).unwrap();

        let desc = app.get(&ObjectId::parse("eth").unwrap()).unwrap();
        assert_eq!(
            desc.render(),
            "eth = new ethernet_spi::EthernetComponent();\n\
             App.register_component(eth);\n\
             eth->set_type(ethernet_spi::ETHERNET_TYPE_W5500);\n\
             eth->set_clk_pin(18);\n\
             eth->set_miso_pin(19);\n\
             eth->set_mosi_pin(23);\n\
             eth->set_cs_pin(5);\n\
             eth->set_interrupt_pin(4);\n\
             eth->set_reset_pin(26);\n\
             eth->set_clock_speed(30);\n\
             eth->set_use_address(\"livingroom.local\");\n"
        );
        assert!(meta.has_define("USE_ETHERNET_SPI"));
        assert_eq!(
            meta.render_sdkconfig(),
            "CONFIG_ETH_SPI_ETHERNET_W5500=y\nCONFIG_ETH_USE_SPI_ETHERNET=y\n"
        );
        assert_eq!(meta.auto_load().collect::<Vec<_>>(), vec!["network"]);
    }

    #[test]
    fn manual_ip_emitted_with_dns_sentinels() {
        let entry = validate(json!({"manual_ip": {
            "static_ip": "192.168.1.50", "gateway": "192.168.1.1", "subnet": "255.255.255.0"
        }}))
        .unwrap();
        let mut meta = BuildMetadata::new();
        let mut app = Application::new(DeviceName::parse("livingroom").unwrap());
        emit(&entry, &mut EmitContext::new(&mut meta, &mut app)).unwrap();
        let rendered = app.descriptors()[0].render();
        assert!(rendered.ends_with(
            "ethernetcomponent_id->set_manual_ip(ethernet_spi::ManualIP{\n\
             \x20 .static_ip = network::IPAddress(192, 168, 1, 50),\n\
             \x20 .gateway = network::IPAddress(192, 168, 1, 1),\n\
             \x20 .subnet = network::IPAddress(255, 255, 255, 0),\n\
             \x20 .dns1 = network::IPAddress(0, 0, 0, 0),\n\
             \x20 .dns2 = network::IPAddress(0, 0, 0, 0),\n\
             });\n"
        ), "{rendered}");
        assert!(!rendered.contains("set_reset_pin"));
    }
}
