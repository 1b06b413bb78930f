//! Rendering properties of the emission engine.

use devgen_codegen::{
    cpp_escape, Application, BuildMetadata, ComponentRegistry, Expr, PeripheralDescriptor,
    Registration,
};
use devgen_core::{DeviceName, ObjectId};
use proptest::prelude::*;

fn object(id: &str, class: &'static str, registration: Registration) -> PeripheralDescriptor {
    PeripheralDescriptor::new(ObjectId::parse(id).unwrap(), class, registration)
}

fn sample_application() -> Application {
    let mut app = Application::new(DeviceName::parse("garage").unwrap());

    let mut usb = object("usb", "max3421e::MAX3421EComponent", Registration::Component);
    usb.set("set_report_status_interval", Expr::Int(5000));
    app.register(usb).unwrap();

    let sensor_id = ObjectId::parse("usb_plugged").unwrap();
    let mut sensor = PeripheralDescriptor::new(
        sensor_id.clone(),
        "binary_sensor::BinarySensor",
        Registration::BinarySensor,
    );
    sensor.set("set_name", Expr::Str("USB \"plugged\"".into()));
    sensor.call_on(
        ObjectId::parse("usb").unwrap(),
        "set_device_connected_sensor",
        vec![Expr::Var(sensor_id)],
    );
    app.register(sensor).unwrap();
    app
}

#[test]
fn test_main_cpp_full_text() {
    let expected = "\
// Generated by devgen. Do not edit.
#include \"esphome.h\"
using namespace esphome;

max3421e::MAX3421EComponent *usb;
binary_sensor::BinarySensor *usb_plugged;

void setup() {
  App.pre_setup(\"garage\", __DATE__ \", \" __TIME__);
  usb = new max3421e::MAX3421EComponent();
  App.register_component(usb);
  usb->set_report_status_interval(5000);
  usb_plugged = new binary_sensor::BinarySensor();
  App.register_binary_sensor(usb_plugged);
  usb_plugged->set_name(\"USB \\\"plugged\\\"\");
  usb->set_device_connected_sensor(usb_plugged);
  App.setup();
}

void loop() {
  App.loop();
}
";
    assert_eq!(sample_application().render_main(), expected);
}

#[test]
fn test_rendering_repeatable() {
    assert_eq!(sample_application().render_main(), sample_application().render_main());
}

#[test]
fn test_manifest_json_stable() {
    let mut meta = BuildMetadata::new();
    meta.add_library("felis/USB-Host-Shield-20", "~1.6.0");
    meta.add_library("SPI", "~2.0.0");
    meta.add_define("USE_BINARY_SENSOR");
    let a = serde_json::to_string_pretty(&meta).unwrap();
    let b = serde_json::to_string_pretty(&meta.clone()).unwrap();
    assert_eq!(a, b);
    assert!(a.find("SPI").unwrap() < a.find("felis").unwrap());
}

proptest! {
    /// Escaped strings are printable ASCII and never end a literal early.
    #[test]
    fn prop_escape_stays_inside_literal(s in "\\PC{0,24}") {
        let escaped = cpp_escape(&s);
        prop_assert!(escaped.bytes().all(|b| (0x20..=0x7e).contains(&b)));
        let bytes = escaped.as_bytes();
        for (i, &b) in bytes.iter().enumerate() {
            if b == b'"' {
                let backslashes = bytes[..i].iter().rev().take_while(|&&c| c == b'\\').count();
                prop_assert!(backslashes % 2 == 1, "unescaped quote in {}", escaped);
            }
        }
    }
}
