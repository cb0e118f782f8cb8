use crate::matcher::plan::{Match, MatchPlan, Rejection};
use crate::provider::transformer::{MatchStrategy, Transformer};
use crate::release::model::Component;
use std::collections::BTreeSet;

enum Outcome {
    Matched(String),
    Rejected(String),
}

/// Pair every component with every transformer whose requirements it satisfies.
///
/// Each pair is decided independently: by the transformer's predicate when it declares one,
/// otherwise by subset checks over labels, resources and traits. Predicate failures count as
/// non-matches. Output order is deterministic (component name, then transformer FQN).
#[tracing::instrument(
    skip_all,
    fields(components = components.len(), transformers = transformers.len())
)]
pub fn match_components<'a>(
    components: &'a [Component],
    transformers: &'a [Transformer],
) -> MatchPlan<'a> {
    let mut comps: Vec<&Component> = components.iter().collect();
    comps.sort_by(|a, b| a.name.cmp(&b.name));
    let mut rules: Vec<&Transformer> = transformers.iter().collect();
    rules.sort_by(|a, b| a.fqn.cmp(&b.fqn));

    let mut plan = MatchPlan::default();
    for component in comps {
        let mut matched = false;
        for &transformer in &rules {
            match evaluate(component, transformer) {
                Outcome::Matched(reason) => {
                    matched = true;
                    plan.matches.push(Match {
                        component,
                        transformer,
                        reason,
                        unhandled_traits: unhandled_traits(component, transformer),
                    });
                }
                Outcome::Rejected(reason) => plan.rejections.push(Rejection {
                    component: component.name.clone(),
                    transformer: transformer.fqn.clone(),
                    reason,
                }),
            }
        }
        if !matched {
            tracing::debug!(component = %component.name, "no transformer matched");
            plan.unmatched.push(component.name.clone());
        }
    }

    tracing::debug!(
        matches = plan.matches.len(),
        unmatched = plan.unmatched.len(),
        "matching done"
    );
    plan
}

fn evaluate(component: &Component, transformer: &Transformer) -> Outcome {
    match &transformer.strategy {
        MatchStrategy::Predicate(p) => match p.evaluate(&component.descriptor()) {
            Ok(true) => Outcome::Matched(format!("matched by {}", p.describe())),
            Ok(false) => Outcome::Rejected(format!("{} did not match", p.describe())),
            Err(e) => Outcome::Rejected(format!("{} failed: {e:#}", p.describe())),
        },
        MatchStrategy::Structural => structural(component, transformer),
    }
}

fn structural(component: &Component, transformer: &Transformer) -> Outcome {
    let mut missing = Vec::new();

    let labels: Vec<String> = transformer
        .required_labels
        .iter()
        .filter_map(|(k, v)| match component.labels.get(k) {
            Some(found) if found == v => None,
            Some(found) => Some(format!("{k}={v} (found {k}={found})")),
            None => Some(format!("{k}={v}")),
        })
        .collect();
    if !labels.is_empty() {
        missing.push(format!("missing required labels: {}", labels.join(", ")));
    }

    let resources: Vec<&str> = transformer
        .required_resources
        .iter()
        .filter(|r| !component.resources.contains_key(r.as_str()))
        .map(String::as_str)
        .collect();
    if !resources.is_empty() {
        missing.push(format!("missing required resources: {}", resources.join(", ")));
    }

    let traits: Vec<&str> = transformer
        .required_traits
        .iter()
        .filter(|t| !component.traits.contains_key(t.as_str()))
        .map(String::as_str)
        .collect();
    if !traits.is_empty() {
        missing.push(format!("missing required traits: {}", traits.join(", ")));
    }

    if missing.is_empty() {
        Outcome::Matched(matched_reason(transformer))
    } else {
        Outcome::Rejected(missing.join("; "))
    }
}

fn matched_reason(transformer: &Transformer) -> String {
    let mut kinds = Vec::new();
    if !transformer.required_labels.is_empty() {
        kinds.push("label");
    }
    if !transformer.required_resources.is_empty() {
        kinds.push("resource");
    }
    if !transformer.required_traits.is_empty() {
        kinds.push("trait");
    }
    match kinds.as_slice() {
        [] => "matched: transformer declares no requirements".to_string(),
        [one] => format!("matched by {one} requirement"),
        [init @ .., last] => format!("matched by {} and {last} requirements", init.join(", ")),
    }
}

fn unhandled_traits(component: &Component, transformer: &Transformer) -> BTreeSet<String> {
    component
        .traits
        .keys()
        .filter(|t| !transformer.handles_trait(t))
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/matcher/matching.rs"]
mod tests;
