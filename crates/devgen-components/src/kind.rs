//! # Peripheral Kind Dispatch
//!
//! [`PeripheralKind`] is the closed set of kinds this crate can validate and
//! emit. Each variant maps to one [`KindSpec`] holding its schema,
//! constraints, emission priority and emission function. Adding a kind means
//! adding a variant and a table row; the compiler finds every other place.

use devgen_codegen::{EmitContext, RegistrationError};
use devgen_core::ConfigEntry;
use devgen_schema::{ComponentConstraints, Schema};
use serde::Serialize;

use crate::{ethernet_spi, max3421e, sensor};

/// Emission function of one kind.
pub type EmitFn = fn(&ConfigEntry, &mut EmitContext<'_>) -> Result<(), RegistrationError>;

/// Every peripheral kind known to the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeripheralKind {
    /// SPI Ethernet MAC.
    EthernetSpi,
    /// USB host controller.
    Max3421e,
    /// `binary_sensor` platform of the USB host controller.
    Max3421eBinarySensor,
    /// `text_sensor` platform of the USB host controller.
    Max3421eTextSensor,
}

/// Static description of one kind.
#[derive(Debug, Clone, Copy)]
pub struct KindSpec {
    /// Top-level domain the kind is configured under.
    pub domain: &'static str,
    /// Platform name for entity platform kinds (`platform: max3421e`).
    pub platform: Option<&'static str>,
    /// Configuration schema of one instance.
    pub schema: &'static Schema,
    /// Build-level constraints.
    pub constraints: &'static ComponentConstraints,
    /// Emission priority. Higher runs first.
    pub priority: i32,
    /// Emission function.
    pub emit: EmitFn,
}

impl PeripheralKind {
    /// All kinds, in table order.
    pub const ALL: [PeripheralKind; 4] = [
        Self::EthernetSpi,
        Self::Max3421e,
        Self::Max3421eBinarySensor,
        Self::Max3421eTextSensor,
    ];

    /// The kind's table row.
    pub fn spec(&self) -> &'static KindSpec {
        match self {
            Self::EthernetSpi => &ETHERNET_SPI,
            Self::Max3421e => &MAX3421E,
            Self::Max3421eBinarySensor => &MAX3421E_BINARY_SENSOR,
            Self::Max3421eTextSensor => &MAX3421E_TEXT_SENSOR,
        }
    }

    /// Qualified name: the domain, or `domain.platform` for entity platforms.
    pub fn name(&self) -> &'static str {
        self.spec().constraints.domain
    }

    /// The component kind configured directly under `domain`.
    pub fn component(domain: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.spec().platform.is_none() && k.spec().domain == domain)
    }

    /// The platform kind selected by `platform` under an entity `domain`.
    pub fn entity_platform(domain: &str, platform: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.spec().domain == domain && k.spec().platform == Some(platform))
    }

    /// Whether `domain` holds entity platform entries.
    pub fn is_entity_domain(domain: &str) -> bool {
        ENTITY_DOMAINS.contains(&domain)
    }
}

/// Domains whose entries select a kind through their `platform` key.
pub const ENTITY_DOMAINS: &[&str] = &["binary_sensor", "text_sensor"];

static ETHERNET_SPI: KindSpec = KindSpec {
    domain: "ethernet_spi",
    platform: None,
    schema: &ethernet_spi::SCHEMA,
    constraints: &ethernet_spi::CONSTRAINTS,
    priority: 60,
    emit: ethernet_spi::emit,
};

static MAX3421E: KindSpec = KindSpec {
    domain: "max3421e",
    platform: None,
    schema: &max3421e::SCHEMA,
    constraints: &max3421e::CONSTRAINTS,
    priority: 0,
    emit: max3421e::emit,
};

static MAX3421E_BINARY_SENSOR: KindSpec = KindSpec {
    domain: "binary_sensor",
    platform: Some("max3421e"),
    schema: &sensor::BINARY_SENSOR_SCHEMA,
    constraints: &sensor::BINARY_SENSOR_CONSTRAINTS,
    priority: -10,
    emit: sensor::emit_binary_sensor,
};

static MAX3421E_TEXT_SENSOR: KindSpec = KindSpec {
    domain: "text_sensor",
    platform: Some("max3421e"),
    schema: &sensor::TEXT_SENSOR_SCHEMA,
    constraints: &sensor::TEXT_SENSOR_CONSTRAINTS,
    priority: -10,
    emit: sensor::emit_text_sensor,
};
