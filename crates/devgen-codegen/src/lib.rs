//! # devgen-codegen: Code Emission Engine
//!
//! Turns validated configuration entries into native setup code and build
//! metadata.
//!
//! ## Pieces
//!
//! - [`Expr`] / [`Statement`]: the C++ subset setup code is written in.
//! - [`PeripheralDescriptor`]: one native object, its registration kind,
//!   and its ordered setter calls.
//! - [`BuildMetadata`]: defines, build flags, sdkconfig options, libraries.
//! - [`ComponentRegistry`] / [`Application`]: ownership of finished
//!   descriptors and `main.cpp` rendering.
//! - [`emit_fields`]: schema-driven setter emission shared by every kind.
//!
//! ## Invariant
//!
//! Rendering is a pure function of the registered descriptors and the
//! accumulated metadata. Two builds of the same document produce
//! byte-identical output.
//!
//! ## Crate Policy
//!
//! - Depends on `devgen-core` and `devgen-schema` internally.
//! - No user-facing errors besides [`RegistrationError`]. Inconsistent
//!   validated input is a defect and panics.

pub mod descriptor;
pub mod emit;
pub mod expr;
pub mod metadata;
pub mod registry;

pub use descriptor::{PeripheralDescriptor, SetterCall};
pub use emit::{emit_fields, expect_id, new_descriptor, struct_init, value_to_expr, EmitContext};
pub use expr::{cpp_escape, Expr, Registration, Statement};
pub use metadata::{BuildMetadata, SdkconfigValue};
pub use registry::{Application, ComponentRegistry, RegistrationError};
