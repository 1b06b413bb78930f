//! # Schema Declarations
//!
//! A [`Schema`] is a statically declared, ordered list of [`FieldSpec`]s plus
//! a list of [`CrossFieldRule`]s. Schemas compose by concatenating
//! `&'static [FieldSpec]` slices in [`Schema::parts`], never by merging maps
//! at runtime:
//!
//! ```
//! use devgen_schema::{Coercion, FieldSpec, Schema};
//!
//! const COMMON: &[FieldSpec] = &[FieldSpec::optional("setup_priority", Coercion::Float)];
//! const OWN: &[FieldSpec] = &[FieldSpec::required("debug", Coercion::Boolean)];
//! const SCHEMA: Schema = Schema::new("demo", &[OWN, COMMON]);
//!
//! let keys: Vec<_> = SCHEMA.fields().map(|f| f.key).collect();
//! assert_eq!(keys, ["debug", "setup_priority"]);
//! ```
//!
//! Declaration order is significant: the validator reports the first
//! failing field in this order, and code emission issues setter calls in
//! this order.

use devgen_core::{ConfigEntry, DeviceName, PinMode, Target, ValidationError};
use serde_json::Value;

/// Whether a field must be present, and what happens when it is not.
#[derive(Debug, Clone, Copy)]
pub enum Presence {
    /// Absent → `MissingField`.
    Required,
    /// Absent → left unset. The native object keeps its disabled sentinel.
    Optional,
    /// Absent → the default literal is coerced and injected.
    Defaulted(DefaultValue),
    /// Absent → filled from the validation context (generated or inferred id).
    Generated,
}

/// A default literal, expressed in raw configuration form.
///
/// Defaults go through the same coercion rule as user input, so omitting a
/// field and writing its default explicitly produce identical entries.
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    /// Integer literal.
    Int(i64),
    /// Boolean literal.
    Bool(bool),
    /// String literal (also used for durations, addresses, enum tags).
    Str(&'static str),
}

impl DefaultValue {
    /// The raw configuration value this default stands for.
    pub fn to_raw(&self) -> Value {
        match self {
            Self::Int(v) => Value::from(*v),
            Self::Bool(v) => Value::Bool(*v),
            Self::Str(v) => Value::String((*v).to_string()),
        }
    }
}

/// One accepted enumeration tag and the native constant it maps to.
#[derive(Debug, Clone, Copy)]
pub struct EnumOption {
    /// Tag in its normalized case.
    pub tag: &'static str,
    /// Native constant emitted for the tag.
    pub native: &'static str,
}

/// Case normalization applied to enumeration input before matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCase {
    /// Match as written.
    Exact,
    /// Upper-case the input first.
    Upper,
    /// Lower-case the input first.
    Lower,
}

/// How a raw value is turned into a typed [`ConfigValue`](devgen_core::ConfigValue).
#[derive(Debug, Clone, Copy)]
pub enum Coercion {
    /// Integer within `min..=max`.
    IntRange {
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
    },
    /// Any finite number.
    Float,
    /// Boolean, accepting `yes/no/on/off/enable/disable` as strings.
    Boolean,
    /// Scalar converted to a string. Booleans are rejected.
    String,
    /// Must already be a string.
    StringStrict,
    /// Dotted-quad IPv4 address.
    Ipv4,
    /// Duration literal with unit.
    TimePeriod,
    /// One of a fixed set of tags.
    Enum {
        /// Accepted tags.
        options: &'static [EnumOption],
        /// Normalization applied before matching.
        case: EnumCase,
    },
    /// Domain suffix such as `.local`.
    DomainName,
    /// Icon reference such as `mdi:usb`.
    Icon,
    /// GPIO number usable in the given direction on the target.
    Pin(PinMode),
    /// Declares a new object id of a native class.
    DeclareId {
        /// Native class of the declared object.
        class: &'static str,
    },
    /// References an object id declared elsewhere.
    UseId {
        /// Native class the referenced object must have.
        class: &'static str,
    },
    /// Nested mapping validated against its own schema.
    Nested(&'static Schema),
}

impl Coercion {
    /// Short human-readable name of the expected type.
    pub fn describe(&self) -> String {
        match self {
            Self::IntRange { min, max } => format!("int in [{min}, {max}]"),
            Self::Float => "float".into(),
            Self::Boolean => "boolean".into(),
            Self::String => "string".into(),
            Self::StringStrict => "strict string".into(),
            Self::Ipv4 => "ipv4 address".into(),
            Self::TimePeriod => "time period".into(),
            Self::Enum { options, .. } => {
                let tags: Vec<&str> = options.iter().map(|o| o.tag).collect();
                format!("one of [{}]", tags.join(", "))
            }
            Self::DomainName => "domain name".into(),
            Self::Icon => "icon".into(),
            Self::Pin(mode) => format!("{mode} pin"),
            Self::DeclareId { class } => format!("id of {class}"),
            Self::UseId { class } => format!("reference to {class}"),
            Self::Nested(schema) => format!("mapping ({})", schema.name),
        }
    }
}

/// Declaration of a single configuration key.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Configuration key.
    pub key: &'static str,
    /// Presence rule.
    pub presence: Presence,
    /// Coercion rule.
    pub coercion: Coercion,
    /// Native setter method receiving this field, if any.
    pub setter: Option<&'static str>,
}

impl FieldSpec {
    /// A required field.
    pub const fn required(key: &'static str, coercion: Coercion) -> Self {
        Self {
            key,
            presence: Presence::Required,
            coercion,
            setter: None,
        }
    }

    /// An optional field without a default.
    pub const fn optional(key: &'static str, coercion: Coercion) -> Self {
        Self {
            key,
            presence: Presence::Optional,
            coercion,
            setter: None,
        }
    }

    /// An optional field with a default.
    pub const fn defaulted(key: &'static str, coercion: Coercion, default: DefaultValue) -> Self {
        Self {
            key,
            presence: Presence::Defaulted(default),
            coercion,
            setter: None,
        }
    }

    /// An object id declaration, generated from the class name when absent.
    pub const fn declare_id(key: &'static str, class: &'static str) -> Self {
        Self {
            key,
            presence: Presence::Generated,
            coercion: Coercion::DeclareId { class },
            setter: None,
        }
    }

    /// A reference to an object of `class`, inferred when exactly one exists.
    pub const fn use_id(key: &'static str, class: &'static str) -> Self {
        Self {
            key,
            presence: Presence::Generated,
            coercion: Coercion::UseId { class },
            setter: None,
        }
    }

    /// Bind this field to a native setter method.
    pub const fn setter(self, method: &'static str) -> Self {
        Self {
            setter: Some(method),
            ..self
        }
    }

    /// Whether the field is guaranteed to be present after validation.
    pub fn always_present(&self) -> bool {
        !matches!(self.presence, Presence::Optional)
    }
}

/// Context handed to cross-field rules.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Peripheral instance path.
    pub instance: &'a str,
    /// Device hostname.
    pub device_name: &'a DeviceName,
    /// Build target.
    pub target: Target,
}

/// A predicate or derivation that runs after every field has been coerced.
#[derive(Debug, Clone, Copy)]
pub struct CrossFieldRule {
    /// Rule name, for tracing.
    pub name: &'static str,
    /// May fill derived fields or reject inconsistent combinations.
    pub apply: fn(&mut ConfigEntry, &RuleContext<'_>) -> Result<(), ValidationError>,
}

/// A statically declared schema.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    /// Schema name, used in diagnostics.
    pub name: &'static str,
    /// Native struct type when this schema is emitted as a struct initializer.
    pub native_struct: Option<&'static str>,
    /// Field declaration slices, concatenated in order.
    pub parts: &'static [&'static [FieldSpec]],
    /// Cross-field rules, applied in order.
    pub rules: &'static [CrossFieldRule],
}

impl Schema {
    /// A schema with the given field slices and no rules.
    pub const fn new(name: &'static str, parts: &'static [&'static [FieldSpec]]) -> Self {
        Self {
            name,
            native_struct: None,
            parts,
            rules: &[],
        }
    }

    /// Attach cross-field rules.
    pub const fn with_rules(self, rules: &'static [CrossFieldRule]) -> Self {
        Self { rules, ..self }
    }

    /// Mark the schema as emitted through a native struct initializer.
    pub const fn native_struct(self, ty: &'static str) -> Self {
        Self {
            native_struct: Some(ty),
            ..self
        }
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        let parts: &'static [&'static [FieldSpec]] = self.parts;
        parts.iter().flat_map(|part| part.iter())
    }

    /// Look up a field by key.
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields().find(|f| f.key == key)
    }

    /// The field declaring this entry's object id, if any.
    pub fn id_field(&self) -> Option<&'static FieldSpec> {
        self.fields()
            .find(|f| matches!(f.coercion, Coercion::DeclareId { .. }))
    }

    /// Native class declared by [`Schema::id_field`].
    pub fn declared_class(&self) -> Option<&'static str> {
        self.id_field().and_then(|f| match f.coercion {
            Coercion::DeclareId { class } => Some(class),
            _ => None,
        })
    }
}
