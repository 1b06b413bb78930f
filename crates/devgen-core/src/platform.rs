//! # Target Platforms and Pin Capabilities
//!
//! Defines the supported target platforms and frameworks, and the GPIO
//! capability tables used to validate pin references.
//!
//! ## Invariant
//!
//! A [`Pin`] can only be constructed through [`Pin::new`], which checks that
//! the GPIO exists on the platform, is not wired to the SPI flash, and can
//! serve the requested direction. Holding a `Pin` is proof of all three.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoercionError;

/// A microcontroller family the firmware is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Espressif ESP32.
    Esp32,
    /// Espressif ESP8266.
    Esp8266,
}

impl Platform {
    /// Returns all supported platforms.
    pub fn all() -> &'static [Platform] {
        &[Self::Esp32, Self::Esp8266]
    }

    /// Returns the identifier used in build documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Esp32 => "esp32",
            Self::Esp8266 => "esp8266",
        }
    }

    /// Look up what a GPIO can do on this platform.
    ///
    /// Returns `None` if the GPIO does not exist.
    pub fn pin_capabilities(&self, gpio: u8) -> Option<PinCapabilities> {
        match self {
            Self::Esp32 => {
                if gpio > 39 || matches!(gpio, 20 | 24 | 28..=31) {
                    return None;
                }
                Some(PinCapabilities {
                    input: true,
                    output: gpio < 34,
                    flash: (6..=11).contains(&gpio),
                })
            }
            Self::Esp8266 => {
                if gpio > 17 {
                    return None;
                }
                Some(PinCapabilities {
                    input: true,
                    output: gpio != 17,
                    flash: (6..=11).contains(&gpio),
                })
            }
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoercionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "esp32" => Ok(Self::Esp32),
            "esp8266" => Ok(Self::Esp8266),
            other => Err(CoercionError::invalid(format!(
                "unknown platform {other:?}, expected one of: esp32, esp8266"
            ))),
        }
    }
}

/// The SDK the firmware is built against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Framework {
    /// Arduino core.
    #[default]
    #[serde(rename = "arduino")]
    Arduino,
    /// Espressif IoT Development Framework.
    #[serde(rename = "esp-idf")]
    EspIdf,
}

impl Framework {
    /// Returns the identifier used in build documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arduino => "arduino",
            Self::EspIdf => "esp-idf",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framework {
    type Err = CoercionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "arduino" => Ok(Self::Arduino),
            "esp-idf" => Ok(Self::EspIdf),
            other => Err(CoercionError::invalid(format!(
                "unknown framework {other:?}, expected one of: arduino, esp-idf"
            ))),
        }
    }
}

/// Platform plus framework of one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Target {
    /// Microcontroller family.
    pub platform: Platform,
    /// SDK.
    pub framework: Framework,
}

/// Direction a pin is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinMode {
    /// Read by the peripheral driver.
    Input,
    /// Driven by the peripheral driver.
    Output,
}

impl fmt::Display for PinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::Output => "output",
        })
    }
}

/// What a single GPIO can do on a given platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinCapabilities {
    /// The pin can be read.
    pub input: bool,
    /// The pin can be driven.
    pub output: bool,
    /// The pin is wired to the SPI flash and unusable.
    pub flash: bool,
}

impl PinCapabilities {
    /// Whether the pin supports the given direction.
    pub fn supports(&self, mode: PinMode) -> bool {
        match mode {
            PinMode::Input => self.input,
            PinMode::Output => self.output,
        }
    }
}

/// A validated GPIO reference, tagged with the direction it was requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pin {
    number: u8,
    mode: PinMode,
}

impl Pin {
    /// Validate a GPIO number for a direction on a platform.
    ///
    /// # Errors
    ///
    /// - [`CoercionError::Invalid`] if the number is negative or the GPIO does
    ///   not exist on the platform.
    /// - [`CoercionError::Capability`] if the GPIO is a flash pin or cannot
    ///   serve `mode`.
    pub fn new(platform: Platform, number: i64, mode: PinMode) -> Result<Self, CoercionError> {
        let gpio = u8::try_from(number).map_err(|_| {
            CoercionError::invalid(format!("GPIO{number} does not exist on {platform}"))
        })?;
        let caps = platform.pin_capabilities(gpio).ok_or_else(|| {
            CoercionError::invalid(format!("GPIO{gpio} does not exist on {platform}"))
        })?;
        if caps.flash {
            return Err(CoercionError::Capability {
                pin: gpio,
                mode,
                reason: format!("GPIO{gpio} is connected to the SPI flash on {platform}"),
            });
        }
        if !caps.supports(mode) {
            return Err(CoercionError::Capability {
                pin: gpio,
                mode,
                reason: format!("GPIO{gpio} is input-only on {platform}"),
            });
        }
        Ok(Self { number: gpio, mode })
    }

    /// The GPIO number.
    pub fn number(&self) -> u8 {
        self.number
    }

    /// The direction the pin was validated for.
    pub fn mode(&self) -> PinMode {
        self.mode
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.number)
    }
}
