use super::*;
use crate::foundation::core::Labels;
use crate::release::model::Component;
use serde_json::{Value, json};
use std::collections::BTreeMap;

fn component() -> Component {
    let mut labels = Labels::new();
    labels.insert("tier".to_string(), "frontend".to_string());
    let mut resources = BTreeMap::new();
    resources.insert("Container".to_string(), json!({}));
    let mut traits = BTreeMap::new();
    traits.insert("Scaling".to_string(), json!({}));
    Component {
        name: "web-1".to_string(),
        labels,
        annotations: Labels::new(),
        resources,
        traits,
        spec: Value::Null,
    }
}

fn eval(expr: Value) -> anyhow::Result<bool> {
    let expr: PredicateExpr = serde_json::from_value(expr)?;
    expr.evaluate(&component().descriptor())
}

#[test]
fn leaf_expressions() {
    assert!(eval(json!({ "hasLabel": "tier" })).unwrap());
    assert!(!eval(json!({ "hasLabel": "app" })).unwrap());
    assert!(eval(json!({ "labelEquals": { "key": "tier", "value": "frontend" } })).unwrap());
    assert!(!eval(json!({ "labelEquals": { "key": "tier", "value": "backend" } })).unwrap());
    assert!(eval(json!({ "labelMatches": { "key": "tier", "pattern": "^front" } })).unwrap());
    assert!(eval(json!({ "hasResource": "Container" })).unwrap());
    assert!(eval(json!({ "hasTrait": "Scaling" })).unwrap());
    assert!(!eval(json!({ "hasTrait": "Expose" })).unwrap());
    assert!(eval(json!({ "nameMatches": "^web-[0-9]+$" })).unwrap());
}

#[test]
fn combinators() {
    assert!(eval(json!({ "all": [] })).unwrap());
    assert!(!eval(json!({ "any": [] })).unwrap());
    assert!(
        eval(json!({
            "all": [
                { "hasResource": "Container" },
                { "not": { "labelEquals": { "key": "tier", "value": "batch" } } }
            ]
        }))
        .unwrap()
    );
    assert!(eval(json!({ "any": [ { "hasTrait": "Expose" }, { "hasLabel": "tier" } ] })).unwrap());
}

#[test]
fn evaluation_failures_are_errors() {
    let err = eval(json!({ "labelMatches": { "key": "app", "pattern": "x" } })).unwrap_err();
    assert_eq!(err.to_string(), "label app is not set");
    let err = eval(json!({ "nameMatches": "(" })).unwrap_err();
    assert!(err.to_string().starts_with("invalid pattern ("));
}

#[test]
fn descriptions() {
    let expr = PredicateExpr::HasLabel("tier".to_string());
    assert_eq!(expr.describe(), "predicate expression");
    let f = FnPredicate(|_: &ComponentDescriptor<'_>| Ok::<_, anyhow::Error>(true));
    assert_eq!(f.describe(), "custom predicate");
    assert!(f.evaluate(&component().descriptor()).unwrap());
}

#[test]
fn descriptor_exposes_capability_keys() {
    let c = component();
    let d = c.descriptor();
    assert_eq!(d.name(), "web-1");
    assert_eq!(d.resource_keys().collect::<Vec<_>>(), ["Container"]);
    assert_eq!(d.trait_keys().collect::<Vec<_>>(), ["Scaling"]);
    assert_eq!(d.labels()["tier"], "frontend");
}
