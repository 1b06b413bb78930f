//! End-to-end builds of YAML documents.

use devgen_components::{build_yaml, validate_document, BuildError, PeripheralKind};
use devgen_core::{PinMode, ValidationError};
use devgen_schema::load_yaml;
use proptest::prelude::*;

const ETHERNET_DEVICE: &str = "\
device:
  name: livingroom
  platform: esp32
  framework: esp-idf
";

const ETHERNET_PINS: &str = "\
ethernet_spi:
  type: W5500
  clk_pin: 18
  miso_pin: 19
  mosi_pin: 23
  cs_pin: 5
  interrupt_pin: 4
";

fn ethernet_doc(extra: &str) -> String {
    format!("{ETHERNET_DEVICE}{ETHERNET_PINS}{extra}")
}

fn validation_error(result: Result<impl std::fmt::Debug, BuildError>) -> ValidationError {
    match result {
        Err(BuildError::Validation(e)) => e,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

fn use_address(doc: &str) -> String {
    let build = validate_document(&load_yaml(doc).unwrap()).unwrap();
    let eth = build
        .instances
        .iter()
        .find(|i| i.kind == PeripheralKind::EthernetSpi)
        .unwrap();
    eth.entry.get_str("use_address").unwrap().to_string()
}

#[test]
fn test_use_address_defaults_to_hostname() {
    assert_eq!(use_address(&ethernet_doc("")), "livingroom.local");
}

#[test]
fn test_use_address_from_manual_ip() {
    let doc = ethernet_doc(
        "  manual_ip:\n    static_ip: 192.168.1.50\n    gateway: 192.168.1.1\n    subnet: 255.255.255.0\n",
    );
    assert_eq!(use_address(&doc), "192.168.1.50");
}

#[test]
fn test_use_address_override_wins() {
    let doc = ethernet_doc(
        "  use_address: custom.host\n  manual_ip:\n    static_ip: 192.168.1.50\n    gateway: 192.168.1.1\n    subnet: 255.255.255.0\n",
    );
    assert_eq!(use_address(&doc), "custom.host");
}

#[test]
fn test_conflicting_transports() {
    let doc = ethernet_doc("wifi:\n  ssid: home\n");
    let err = validation_error(build_yaml(&doc));
    assert_eq!(
        err,
        ValidationError::Conflict {
            first: "ethernet_spi".into(),
            second: "wifi".into()
        }
    );
    assert!(err.to_string().contains("ethernet_spi") && err.to_string().contains("wifi"));
}

#[test]
fn test_ethernet_requires_esp_idf() {
    let doc = format!("device:\n  name: livingroom\n  platform: esp32\n{ETHERNET_PINS}");
    let err = validation_error(build_yaml(&doc));
    assert_eq!(err.kind(), "unsupported_platform");
}

#[test]
fn test_ethernet_requires_esp32() {
    let doc = format!("device:\n  name: livingroom\n  platform: esp8266\n  framework: esp-idf\n{ETHERNET_PINS}");
    let err = validation_error(build_yaml(&doc));
    assert_eq!(
        err,
        ValidationError::MissingDependency {
            component: "ethernet_spi".into(),
            requires: "esp32".into()
        }
    );
}

#[test]
fn test_input_only_pin_for_output_field() {
    let doc = ethernet_doc("").replace("cs_pin: 5", "cs_pin: 34");
    let err = validation_error(build_yaml(&doc));
    assert!(matches!(
        err,
        ValidationError::Capability { ref instance, ref field, pin: 34, mode: PinMode::Output, .. }
            if instance == "ethernet_spi" && field == "cs_pin"
    ));
}

#[test]
fn test_output_pin_reflected_unchanged() {
    let doc = ethernet_doc("").replace("cs_pin: 5", "cs_pin: GPIO15");
    let out = build_yaml(&doc).unwrap();
    assert!(out.main_cpp().contains("->set_cs_pin(15);"));
}

#[test]
fn test_unknown_field_rejected() {
    let doc = ethernet_doc("  speed: 10\n");
    let err = validation_error(build_yaml(&doc));
    assert_eq!(
        err,
        ValidationError::UnknownField {
            instance: "ethernet_spi".into(),
            field: "speed".into()
        }
    );
}

#[test]
fn test_full_ethernet_build_outputs() {
    let out = build_yaml(&ethernet_doc("logger:\n")).unwrap();
    assert_eq!(out.defines_h(), "#pragma once\n#define USE_ETHERNET_SPI\n");
    assert_eq!(
        out.sdkconfig_defaults(),
        "CONFIG_ETH_SPI_ETHERNET_W5500=y\nCONFIG_ETH_USE_SPI_ETHERNET=y\n"
    );
    let main = out.main_cpp();
    assert!(main.contains("ethernet_spi::EthernetComponent *ethernetcomponent_id;"));
    assert!(main.contains("  ethernetcomponent_id->set_use_address(\"livingroom.local\");\n"));
    let manifest = out.manifest();
    assert_eq!(manifest["device"]["name"], "livingroom");
    assert_eq!(manifest["device"]["framework"], "esp-idf");
    assert_eq!(manifest["metadata"]["auto_load"], serde_json::json!(["network"]));
}

const USB_DOC: &str = "\
device:
  name: usb-hub
  platform: esp8266
max3421e:
  id: usb
  report_status_interval: 30s
  debug_usb_lib: true
binary_sensor:
  - platform: max3421e
    device_connected:
      name: USB connected
  - platform: max3421e
    max3421e_id: usb
    device_connected:
      id: usb_plugged_2
      name: USB connected again
      internal: true
  - platform: gpio
    pin: 4
text_sensor:
  - platform: max3421e
    device_info:
      name: USB device
";

#[test]
fn test_usb_build() {
    let out = build_yaml(USB_DOC).unwrap();
    let ids: Vec<_> = out
        .application
        .descriptors()
        .iter()
        .map(|d| d.id().as_str().to_string())
        .collect();
    assert_eq!(ids, ["usb", "binarysensor_id", "usb_plugged_2", "textsensor_id"]);

    // Two binary sensors, one define.
    assert_eq!(
        out.defines_h(),
        "#pragma once\n#define USE_BINARY_SENSOR\n#define USE_TEXT_SENSOR\n"
    );
    assert_eq!(out.metadata.build_flags().count(), 2);
    assert_eq!(out.metadata.libraries().count(), 2);

    let main = out.main_cpp();
    assert!(main.contains("  usb->set_report_status_interval(30000);\n"));
    assert!(main.contains("  usb->set_device_connected_sensor(binarysensor_id);\n"));
    assert!(main.contains("  usb->set_device_connected_sensor(usb_plugged_2);\n"));
    assert!(main.contains("  usb->set_device_info_sensor(textsensor_id);\n"));
    assert!(main.contains("  usb_plugged_2->set_internal(true);\n"));
}

#[test]
fn test_entity_without_parent() {
    let doc = "device:\n  name: hub\n  platform: esp32\nbinary_sensor:\n  - platform: max3421e\n    device_connected:\n      name: x\n";
    let err = validation_error(build_yaml(doc));
    assert_eq!(
        err,
        ValidationError::MissingDependency {
            component: "binary_sensor.max3421e".into(),
            requires: "max3421e".into()
        }
    );
}

#[test]
fn test_entity_references_wrong_class() {
    let doc = format!(
        "{ETHERNET_DEVICE}max3421e:\n  id: usb\n{ETHERNET_PINS}  id: eth\nbinary_sensor:\n  - platform: max3421e\n    max3421e_id: eth\n    device_connected:\n      name: x\n"
    );
    let err = validation_error(build_yaml(&doc));
    assert!(matches!(
        err,
        ValidationError::UnresolvedReference { ref id, .. } if id == "eth"
    ));
}

#[test]
fn test_duplicate_ids() {
    let doc = format!("{ETHERNET_DEVICE}max3421e:\n  id: shared\n{ETHERNET_PINS}  id: shared\n");
    let err = validation_error(build_yaml(&doc));
    assert_eq!(
        err,
        ValidationError::DuplicateId {
            id: "shared".into(),
            first: "ethernet_spi".into(),
            second: "max3421e".into()
        }
    );
}

#[test]
fn test_generated_id_yields_to_later_explicit_id() {
    let doc = "\
device:
  name: hub
  platform: esp32
max3421e:
binary_sensor:
  - platform: max3421e
    device_connected:
      name: first
  - platform: max3421e
    device_connected:
      id: binarysensor_id
      name: second
";
    let out = build_yaml(doc).unwrap();
    let ids: Vec<_> = out
        .application
        .descriptors()
        .iter()
        .map(|d| d.id().as_str().to_string())
        .collect();
    assert_eq!(ids, ["max3421ecomponent_id", "binarysensor_id_2", "binarysensor_id"]);
    assert!(out.main_cpp().contains("  binarysensor_id_2->set_name(\"first\");\n"));
    assert!(out.main_cpp().contains("  binarysensor_id->set_name(\"second\");\n"));
}

#[test]
fn test_builds_are_byte_identical() {
    let a = build_yaml(USB_DOC).unwrap();
    let b = build_yaml(USB_DOC).unwrap();
    assert_eq!(a.main_cpp(), b.main_cpp());
    assert_eq!(a.defines_h(), b.defines_h());
    assert_eq!(a.manifest(), b.manifest());
}

#[test]
fn test_reemitting_validated_build_is_identical() {
    let build = validate_document(&load_yaml(USB_DOC).unwrap()).unwrap();
    let first = build.clone().emit().unwrap();
    let second = build.emit().unwrap();
    assert_eq!(first.main_cpp(), second.main_cpp());
    assert_eq!(first.sdkconfig_defaults(), second.sdkconfig_defaults());
}

proptest! {
    /// Any valid clock speed appears unchanged in the setter call.
    #[test]
    fn prop_clock_speed_emitted(speed in 1u32..=80) {
        let out = build_yaml(&ethernet_doc(&format!("  clock_speed: {speed}\n"))).unwrap();
        let expected = format!("->set_clock_speed({speed});");
        prop_assert!(out.main_cpp().contains(&expected));
    }

    /// Every ESP32 pin above 33 is rejected for outputs.
    #[test]
    fn prop_input_only_pins_rejected(pin in 34u8..=39) {
        let doc = ethernet_doc("").replace("mosi_pin: 23", &format!("mosi_pin: {pin}"));
        let err = validation_error(build_yaml(&doc));
        prop_assert_eq!(err.kind(), "capability");
    }
}
