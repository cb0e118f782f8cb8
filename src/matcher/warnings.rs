use crate::matcher::plan::{Match, MatchPlan};
use std::collections::{BTreeMap, BTreeSet};

/// A trait capability that none of a component's matched transformers handles.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("component {component}: unhandled trait {trait_fqn}")]
pub struct UnhandledTrait {
    /// Component name.
    pub component: String,
    /// Trait FQN.
    pub trait_fqn: String,
}

/// Traits reported unhandled by *every* transformer matched to their component.
///
/// One matched transformer handling a trait is enough to suppress it. Components without
/// matches contribute nothing (they are reported as unmatched instead).
pub fn collect_unhandled(plan: &MatchPlan<'_>) -> Vec<UnhandledTrait> {
    let mut by_component: BTreeMap<&str, Vec<&Match<'_>>> = BTreeMap::new();
    for m in &plan.matches {
        by_component
            .entry(m.component.name.as_str())
            .or_default()
            .push(m);
    }

    let mut out = Vec::new();
    for (component, matches) in by_component {
        let candidates: BTreeSet<&str> = matches
            .iter()
            .flat_map(|m| m.unhandled_traits.iter().map(String::as_str))
            .collect();
        for t in candidates {
            if matches.iter().all(|m| m.unhandled_traits.contains(t)) {
                out.push(UnhandledTrait {
                    component: component.to_string(),
                    trait_fqn: t.to_string(),
                });
            }
        }
    }
    out
}

/// Unhandled-trait warnings as display strings (`component <name>: unhandled trait <fqn>`).
pub fn collect_warnings(plan: &MatchPlan<'_>) -> Vec<String> {
    collect_unhandled(plan)
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/matcher/warnings.rs"]
mod tests;
