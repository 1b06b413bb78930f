//! # Component Constraints
//!
//! Static declarations of how a component relates to the rest of a build:
//! which domains it excludes, which it needs, and which framework it runs on.
//! Checked once per build against the set of declared top-level domains,
//! before any entry is validated.

use std::collections::BTreeSet;

use devgen_core::{Framework, Platform, Target, ValidationError};

/// Build-level constraints declared by one component.
#[derive(Debug, Clone, Copy)]
pub struct ComponentConstraints {
    /// Component domain name.
    pub domain: &'static str,
    /// Domains that must not appear alongside this one.
    pub conflicts_with: &'static [&'static str],
    /// Domains that must appear alongside this one. Platform names count as domains.
    pub dependencies: &'static [&'static str],
    /// Platforms the component supports. Empty means all.
    pub platforms: &'static [Platform],
    /// Framework the component requires, if any.
    pub framework: Option<Framework>,
    /// Whether the domain accepts a list of instances.
    pub multi_conf: bool,
}

impl ComponentConstraints {
    /// A component with no constraints.
    pub const fn unconstrained(domain: &'static str) -> Self {
        Self {
            domain,
            conflicts_with: &[],
            dependencies: &[],
            platforms: &[],
            framework: None,
            multi_conf: false,
        }
    }
}

/// Check one component's constraints against the declared domains and target.
///
/// Order: conflicts, then dependencies, then platform and framework.
///
/// # Errors
///
/// - [`ValidationError::Conflict`] for the first declared conflicting domain.
/// - [`ValidationError::MissingDependency`] for the first absent dependency.
/// - [`ValidationError::UnsupportedPlatform`] if the target does not fit.
pub fn check_constraints(
    constraints: &ComponentConstraints,
    declared: &BTreeSet<String>,
    target: Target,
) -> Result<(), ValidationError> {
    if let Some(other) = constraints
        .conflicts_with
        .iter()
        .find(|other| declared.contains(**other))
    {
        return Err(ValidationError::Conflict {
            first: constraints.domain.to_string(),
            second: (*other).to_string(),
        });
    }

    if let Some(missing) = constraints
        .dependencies
        .iter()
        .find(|dep| !declared.contains(**dep))
    {
        return Err(ValidationError::MissingDependency {
            component: constraints.domain.to_string(),
            requires: (*missing).to_string(),
        });
    }

    if !constraints.platforms.is_empty() && !constraints.platforms.contains(&target.platform) {
        let supported: Vec<&str> = constraints.platforms.iter().map(|p| p.as_str()).collect();
        return Err(ValidationError::UnsupportedPlatform {
            component: constraints.domain.to_string(),
            reason: format!(
                "platform {} is not supported, use one of [{}]",
                target.platform,
                supported.join(", ")
            ),
        });
    }

    if let Some(required) = constraints.framework {
        if required != target.framework {
            return Err(ValidationError::UnsupportedPlatform {
                component: constraints.domain.to_string(),
                reason: format!(
                    "requires the {} framework, but {} is selected",
                    required.as_str(),
                    target.framework.as_str()
                ),
            });
        }
    }

    Ok(())
}
