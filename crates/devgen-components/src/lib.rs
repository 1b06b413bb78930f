//! # devgen-components: Peripheral Kinds and the Build Driver
//!
//! Each peripheral kind is a module declaring a static [`Schema`](devgen_schema::Schema),
//! its [`ComponentConstraints`](devgen_schema::ComponentConstraints), and an
//! emission function. [`PeripheralKind`] ties them together in a closed
//! dispatch table, and [`build`] drives a whole document through validation
//! and emission.
//!
//! | Kind | Domain | Priority |
//! |---|---|---|
//! | [`ethernet_spi`] | `ethernet_spi` | 60 |
//! | [`max3421e`] | `max3421e` | 0 |
//! | [`sensor`] | `binary_sensor.max3421e`, `text_sensor.max3421e` | -10 |
//!
//! ## Crate Policy
//!
//! - Kinds hold no state. Everything mutable lives in the validation
//!   context, the metadata accumulator, or the registry.
//! - Emission functions only run on entries validated against their own schema.

pub mod build;
pub mod common;
pub mod ethernet_spi;
pub mod kind;
pub mod max3421e;
pub mod sensor;

pub use build::{
    build_document, build_yaml, parse_device, validate_document, BuildError, BuildOutput,
    DeviceConfig, ValidatedBuild, ValidatedInstance,
};
pub use kind::{KindSpec, PeripheralKind};
