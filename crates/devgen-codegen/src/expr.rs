//! # Native Expressions and Statements
//!
//! A minimal model of the C++ that setup code is made of. Expressions render
//! to source text with [`fmt::Display`]; rendering is a pure function of the
//! value, so the same statement always yields the same bytes.

use std::fmt;
use std::net::Ipv4Addr;

use devgen_core::ObjectId;
use serde::Serialize;

/// A native expression passed as a setter argument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Expr {
    /// Integer literal.
    Int(i64),
    /// Floating-point literal, rendered with an `f` suffix.
    Float(f64),
    /// `true` / `false`.
    Bool(bool),
    /// String literal, escaped on rendering.
    Str(String),
    /// Qualified constant such as `ethernet_spi::ETHERNET_TYPE_W5500`.
    Constant(String),
    /// `network::IPAddress(a, b, c, d)`.
    IpAddress(Ipv4Addr),
    /// Designated struct initializer.
    StructInit {
        /// Native struct type.
        ty: String,
        /// Fields in emission order.
        fields: Vec<(String, Expr)>,
    },
    /// Reference to an allocated object.
    Var(ObjectId),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{v:.1}f")
                } else {
                    write!(f, "{v}f")
                }
            }
            Self::Bool(v) => write!(f, "{v}"),
            Self::Str(s) => write!(f, "\"{}\"", cpp_escape(s)),
            Self::Constant(c) => f.write_str(c),
            Self::IpAddress(ip) => {
                let [a, b, c, d] = ip.octets();
                write!(f, "network::IPAddress({a}, {b}, {c}, {d})")
            }
            Self::StructInit { ty, fields } => {
                writeln!(f, "{ty}{{")?;
                for (name, value) in fields {
                    writeln!(f, "  .{name} = {value},")?;
                }
                f.write_str("}")
            }
            Self::Var(id) => f.write_str(id.as_str()),
        }
    }
}

/// Escape a string for inclusion in a C++ string literal.
///
/// Non-printable and non-ASCII bytes are written as octal escapes so the
/// generated file stays pure ASCII.
pub fn cpp_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            // `??x` would form a trigraph.
            b'?' => out.push_str("\\?"),
            0x20..=0x7e => out.push(byte as char),
            other => out.push_str(&format!("\\{other:03o}")),
        }
    }
    out
}

/// How an allocated object is registered with the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Registration {
    /// Lifecycle component (`App.register_component`).
    Component,
    /// Binary sensor entity (`App.register_binary_sensor`).
    BinarySensor,
    /// Text sensor entity (`App.register_text_sensor`).
    TextSensor,
}

impl Registration {
    /// The application method performing this registration.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Component => "register_component",
            Self::BinarySensor => "register_binary_sensor",
            Self::TextSensor => "register_text_sensor",
        }
    }
}

/// One line of generated setup code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Statement {
    /// `id = new Class();`
    Allocate {
        /// Object id.
        id: ObjectId,
        /// Native class.
        class: String,
    },
    /// `App.register_x(id);`
    Register {
        /// Registration kind.
        kind: Registration,
        /// Object id.
        id: ObjectId,
    },
    /// `target->method(args...);`
    Call {
        /// Receiving object.
        target: ObjectId,
        /// Method name.
        method: String,
        /// Arguments.
        args: Vec<Expr>,
    },
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocate { id, class } => write!(f, "{id} = new {class}();"),
            Self::Register { kind, id } => write!(f, "App.{}({id});", kind.method()),
            Self::Call {
                target,
                method,
                args,
            } => {
                write!(f, "{target}->{method}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(");")
            }
        }
    }
}
