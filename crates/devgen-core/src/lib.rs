//! # devgen-core: Foundational Types for devgen
//!
//! This crate defines the typed vocabulary shared by the schema validator and
//! the code emitter. Every other crate in the workspace depends on
//! `devgen-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Validated newtypes.** `Pin`, `ObjectId`, `DeviceName` and `TimePeriod`
//!    can only be built through checking constructors. Code emission splices
//!    them into generated source without re-checking.
//!
//! 2. **One error taxonomy.** [`ValidationError`] is the single user-facing
//!    error type for configuration problems. Every variant names the
//!    peripheral instance and the offending field.
//!
//! 3. **Platform tables are data.** GPIO capabilities live in
//!    [`Platform::pin_capabilities`], one exhaustive `match` per platform.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `devgen-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod platform;
pub mod temporal;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use error::{CoercionError, ValidationError};
pub use identity::{DeviceName, ObjectId, MAX_DEVICE_NAME_LEN};
pub use platform::{Framework, Pin, PinCapabilities, PinMode, Platform, Target};
pub use temporal::TimePeriod;
pub use value::{ConfigEntry, ConfigValue, EnumChoice};
