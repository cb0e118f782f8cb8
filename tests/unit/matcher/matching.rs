use super::*;
use crate::foundation::core::Labels;
use serde_json::{Value, json};
use std::collections::BTreeMap;

fn component(name: &str, labels: &[(&str, &str)], resources: &[&str], traits: &[&str]) -> Component {
    Component {
        name: name.to_string(),
        labels: labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Labels>(),
        annotations: Labels::new(),
        resources: resources
            .iter()
            .map(|r| (r.to_string(), json!({})))
            .collect::<BTreeMap<_, _>>(),
        traits: traits
            .iter()
            .map(|t| (t.to_string(), json!({})))
            .collect::<BTreeMap<_, _>>(),
        spec: Value::Null,
    }
}

#[test]
fn resource_requirement_matches_and_missing_trait_rejects() {
    let components = vec![component("web", &[], &["Container"], &[])];
    let transformers = vec![
        Transformer::new("WebTransformer").require_resource("Container"),
        Transformer::new("ScalingTransformer")
            .require_resource("Container")
            .require_trait("Scaling"),
    ];

    let plan = match_components(&components, &transformers);
    assert_eq!(plan.matches.len(), 1);
    assert_eq!(plan.matches[0].transformer.fqn, "WebTransformer");
    assert_eq!(plan.matches[0].reason, "matched by resource requirement");
    assert!(plan.unmatched.is_empty());

    assert_eq!(plan.rejections.len(), 1);
    let r = &plan.rejections[0];
    assert_eq!(r.transformer, "ScalingTransformer");
    assert_eq!(r.reason, "missing required traits: Scaling");
}

#[test]
fn structural_match_is_the_subset_relation() {
    let label_sets: [&[(&str, &str)]; 3] = [&[], &[("tier", "web")], &[("tier", "db")]];
    let resource_sets: [&[&str]; 3] = [&[], &["Container"], &["Container", "Volume"]];
    let trait_sets: [&[&str]; 3] = [&[], &["Scaling"], &["Scaling", "Expose"]];

    let mut components = Vec::new();
    for (li, labels) in label_sets.iter().enumerate() {
        for (ri, resources) in resource_sets.iter().enumerate() {
            for (ti, traits) in trait_sets.iter().enumerate() {
                components.push(component(&format!("c{li}{ri}{ti}"), labels, resources, traits));
            }
        }
    }
    let mut transformers = Vec::new();
    for (li, labels) in label_sets.iter().enumerate() {
        for (ri, resources) in resource_sets.iter().enumerate() {
            for (ti, traits) in trait_sets.iter().enumerate() {
                let mut t = Transformer::new(format!("t{li}{ri}{ti}"));
                for (k, v) in labels.iter() {
                    t = t.require_label(*k, *v);
                }
                for r in resources.iter() {
                    t = t.require_resource(*r);
                }
                for tr in traits.iter() {
                    t = t.require_trait(*tr);
                }
                transformers.push(t);
            }
        }
    }

    let plan = match_components(&components, &transformers);
    for c in &components {
        for t in &transformers {
            let expected = t.required_labels.iter().all(|(k, v)| c.labels.get(k) == Some(v))
                && t.required_resources.iter().all(|r| c.resources.contains_key(r))
                && t.required_traits.iter().all(|tr| c.traits.contains_key(tr));
            let matched = plan
                .matches
                .iter()
                .any(|m| m.component.name == c.name && m.transformer.fqn == t.fqn);
            let rejected = plan
                .rejections
                .iter()
                .any(|r| r.component == c.name && r.transformer == t.fqn);
            assert_eq!(matched, expected, "{} / {}", c.name, t.fqn);
            assert_ne!(matched, rejected, "{} / {}", c.name, t.fqn);
        }
    }
}

#[test]
fn unmatched_and_matched_partition_components() {
    let components = vec![
        component("web", &[], &["Container"], &[]),
        component("db", &[], &["Volume"], &[]),
        component("cache", &[], &["Container"], &[]),
    ];
    let transformers = vec![Transformer::new("deploy").require_resource("Container")];
    let plan = match_components(&components, &transformers);

    let matched: BTreeSet<&str> = plan.matches.iter().map(|m| m.component.name.as_str()).collect();
    let unmatched: BTreeSet<&str> = plan.unmatched.iter().map(String::as_str).collect();
    assert!(matched.is_disjoint(&unmatched));
    let all: BTreeSet<&str> = matched.union(&unmatched).copied().collect();
    assert_eq!(all, BTreeSet::from(["cache", "db", "web"]));
    assert_eq!(plan.unmatched, ["db"]);
}

#[test]
fn output_is_ordered_by_component_then_transformer() {
    let components = vec![
        component("b", &[], &["Container"], &[]),
        component("a", &[], &["Container"], &[]),
    ];
    let transformers = vec![Transformer::new("z"), Transformer::new("y")];
    let plan = match_components(&components, &transformers);
    let order: Vec<(&str, &str)> = plan
        .matches
        .iter()
        .map(|m| (m.component.name.as_str(), m.transformer.fqn.as_str()))
        .collect();
    assert_eq!(order, [("a", "y"), ("a", "z"), ("b", "y"), ("b", "z")]);
    assert_eq!(
        plan.matches[0].reason,
        "matched: transformer declares no requirements"
    );
    assert_eq!(plan.matches_for("b").count(), 2);
}

#[test]
fn label_mismatch_reports_found_value() {
    let components = vec![component("web", &[("tier", "db")], &["Container"], &[])];
    let transformers = vec![
        Transformer::new("t")
            .require_label("tier", "web")
            .require_label("app", "blog")
            .require_resource("Container")
            .require_resource("Volume"),
    ];
    let plan = match_components(&components, &transformers);
    assert_eq!(
        plan.rejections[0].reason,
        "missing required labels: app=blog, tier=web (found tier=db); \
         missing required resources: Volume"
    );
}

#[test]
fn combined_requirements_reason() {
    let components = vec![component("web", &[("tier", "web")], &["Container"], &["Scaling"])];
    let transformers = vec![
        Transformer::new("t")
            .require_label("tier", "web")
            .require_resource("Container")
            .require_trait("Scaling"),
    ];
    let plan = match_components(&components, &transformers);
    assert_eq!(
        plan.matches[0].reason,
        "matched by label, resource and trait requirements"
    );
}

#[test]
fn predicate_strategy_overrides_structural_checks() {
    let components = vec![
        component("web", &[], &["Container"], &[]),
        component("worker", &[], &["Container"], &[]),
    ];
    let transformers = vec![
        // Requirements are ignored once a predicate is declared.
        Transformer::new("by-name")
            .require_trait("Never")
            .with_predicate_fn(|d| Ok(d.name() == "web")),
        Transformer::new("broken").with_predicate_fn(|_| anyhow::bail!("boom")),
    ];
    let plan = match_components(&components, &transformers);

    assert_eq!(plan.matches.len(), 1);
    assert_eq!(plan.matches[0].component.name, "web");
    assert_eq!(plan.matches[0].reason, "matched by custom predicate");
    assert_eq!(plan.unmatched, ["worker"]);

    let reasons: Vec<(&str, &str, &str)> = plan
        .rejections
        .iter()
        .map(|r| (r.component.as_str(), r.transformer.as_str(), r.reason.as_str()))
        .collect();
    assert!(reasons.contains(&("web", "broken", "custom predicate failed: boom")));
    assert!(reasons.contains(&("worker", "by-name", "custom predicate did not match")));
}

#[test]
fn unhandled_traits_exclude_required_and_optional() {
    let components = vec![component(
        "api",
        &[],
        &["Container"],
        &["Scaling", "Expose", "Logging"],
    )];
    let transformers = vec![
        Transformer::new("t")
            .require_trait("Scaling")
            .optional_trait("Expose"),
    ];
    let plan = match_components(&components, &transformers);
    assert_eq!(
        plan.matches[0].unhandled_traits,
        BTreeSet::from(["Logging".to_string()])
    );

    let summary = plan.summary();
    assert_eq!(summary.matches[0].component, "api");
    assert_eq!(summary.matches[0].transformer, "t");
    assert!(!plan.is_empty());
}

#[test]
fn empty_inputs_give_empty_plan() {
    let plan = match_components(&[], &[]);
    assert!(plan.is_empty());
    assert!(plan.rejections.is_empty());
}
