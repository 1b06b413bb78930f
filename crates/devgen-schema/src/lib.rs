//! # devgen-schema: Declarative Configuration Schemas
//!
//! Turns untrusted, loosely typed build documents into typed
//! [`ConfigEntry`](devgen_core::ConfigEntry) values.
//!
//! ## Declarations (`schema`)
//!
//! A [`Schema`] is an ordered concatenation of `&'static [FieldSpec]`
//! slices. Common field groups (the `setup_priority` group, entity
//! fields) are shared as slices and spliced into each component's schema.
//!
//! ## Coercion (`coerce`)
//!
//! Primitive coercers map one raw JSON value to one typed value. They carry
//! no location; [`validate`] attaches the instance and field path.
//!
//! ## Validation (`validate`)
//!
//! - [`validate_entry`] checks one instance against its schema, injecting
//!   defaults and resolving ids through a build-wide [`ValidationContext`].
//!
//! ## Constraints (`constraints`)
//!
//! - [`check_constraints`] enforces conflicts, dependencies and
//!   platform/framework restrictions at build level.
//!
//! ## Crate Policy
//!
//! - Depends only on `devgen-core` internally.
//! - Validation is a trust boundary: nothing unvalidated reaches emission.
//! - Defaults pass through the same coercion as user input.

pub mod coerce;
pub mod constraints;
pub mod document;
pub mod schema;
pub mod validate;

pub use constraints::{check_constraints, ComponentConstraints};
pub use document::{load_yaml, yaml_to_json_value, DocumentError};
pub use schema::{
    Coercion, CrossFieldRule, DefaultValue, EnumCase, EnumOption, FieldSpec, Presence,
    RuleContext, Schema,
};
pub use validate::{validate_entry, DeclaredId, ValidationContext};
