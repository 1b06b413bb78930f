//! Field groups shared by several schemas.

use devgen_schema::{Coercion, DefaultValue, EnumCase, EnumOption, FieldSpec};

/// Fields every lifecycle component accepts, appended to its own.
pub const COMPONENT_FIELDS: &[FieldSpec] =
    &[FieldSpec::optional("setup_priority", Coercion::Float).setter("set_setup_priority")];

/// Entity categories.
pub const ENTITY_CATEGORIES: &[EnumOption] = &[
    EnumOption {
        tag: "none",
        native: "ENTITY_CATEGORY_NONE",
    },
    EnumOption {
        tag: "config",
        native: "ENTITY_CATEGORY_CONFIG",
    },
    EnumOption {
        tag: "diagnostic",
        native: "ENTITY_CATEGORY_DIAGNOSTIC",
    },
];

/// Fields every entity accepts. Diagnostic entities are the only kind this
/// crate declares, so `entity_category` defaults to `diagnostic`.
pub const ENTITY_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("name", Coercion::String).setter("set_name"),
    FieldSpec::defaulted("disabled_by_default", Coercion::Boolean, DefaultValue::Bool(false))
        .setter("set_disabled_by_default"),
    FieldSpec::defaulted(
        "entity_category",
        Coercion::Enum {
            options: ENTITY_CATEGORIES,
            case: EnumCase::Lower,
        },
        DefaultValue::Str("diagnostic"),
    )
    .setter("set_entity_category"),
    FieldSpec::defaulted("internal", Coercion::Boolean, DefaultValue::Bool(false))
        .setter("set_internal"),
];
