//! # Components Subcommand
//!
//! Lists the peripheral kinds the generator knows, with their fields.

use anyhow::Result;
use clap::Args;
use devgen_components::PeripheralKind;
use devgen_schema::{FieldSpec, Presence, Schema};

/// Arguments for the `devgen components` subcommand.
#[derive(Args, Debug)]
pub struct ComponentsArgs {
    /// Show only the kind with this qualified name (`ethernet_spi`,
    /// `binary_sensor.max3421e`).
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Include nested fields.
    #[arg(long)]
    pub nested: bool,
}

/// Execute the components subcommand.
///
/// Returns exit code: 0, or 1 if `NAME` matches no kind.
pub fn run_components(args: &ComponentsArgs) -> Result<u8> {
    let kinds: Vec<PeripheralKind> = PeripheralKind::ALL
        .into_iter()
        .filter(|k| args.name.as_deref().map_or(true, |n| n == k.name()))
        .collect();

    if kinds.is_empty() {
        println!("FAIL: no peripheral kind named '{}'", args.name.as_deref().unwrap_or_default());
        return Ok(1);
    }

    for kind in kinds {
        print!("{}", describe_kind(kind, args.nested));
    }
    Ok(0)
}

/// Text listing of one kind.
pub fn describe_kind(kind: PeripheralKind, nested: bool) -> String {
    let spec = kind.spec();
    let c = spec.constraints;
    let mut out = format!("{} (priority {})\n", kind.name(), spec.priority);
    if !c.platforms.is_empty() {
        let names: Vec<&str> = c.platforms.iter().map(|p| p.as_str()).collect();
        out.push_str(&format!("  platforms: {}\n", names.join(", ")));
    }
    if let Some(framework) = c.framework {
        out.push_str(&format!("  framework: {framework}\n"));
    }
    if !c.dependencies.is_empty() {
        out.push_str(&format!("  requires: {}\n", c.dependencies.join(", ")));
    }
    if !c.conflicts_with.is_empty() {
        out.push_str(&format!("  conflicts with: {}\n", c.conflicts_with.join(", ")));
    }
    push_fields(&mut out, spec.schema, "", nested);
    out
}

fn push_fields(out: &mut String, schema: &Schema, prefix: &str, nested: bool) {
    for field in schema.fields() {
        out.push_str(&format!("  {}\n", field_line(field, prefix)));
        if let (true, devgen_schema::Coercion::Nested(inner)) = (nested, field.coercion) {
            push_fields(out, inner, &format!("{prefix}{}.", field.key), nested);
        }
    }
}

fn field_line(field: &FieldSpec, prefix: &str) -> String {
    let presence = match field.presence {
        Presence::Required => "required".to_string(),
        Presence::Optional => "optional".to_string(),
        Presence::Defaulted(d) => format!("default {}", d.to_raw()),
        Presence::Generated => "generated".to_string(),
    };
    let mut line = format!(
        "{prefix}{}: {} ({presence})",
        field.key,
        field.coercion.describe()
    );
    if let Some(setter) = field.setter {
        line.push_str(&format!(" -> {setter}"));
    }
    line
}
