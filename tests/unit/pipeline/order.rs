use super::*;
use serde_json::{Value, json};

fn res(api_version: &str, kind: &str, namespace: Option<&str>, name: &str, component: &str) -> Resource {
    let mut metadata = json!({ "name": name });
    if let Some(ns) = namespace {
        metadata["namespace"] = Value::String(ns.to_string());
    }
    let Value::Object(obj) = json!({ "apiVersion": api_version, "kind": kind, "metadata": metadata })
    else {
        unreachable!()
    };
    Resource::new(obj, component, "t")
}

fn keys(resources: &[Resource]) -> Vec<String> {
    resources
        .iter()
        .map(|r| format!("{}/{}/{}", r.kind(), r.namespace(), r.name()))
        .collect()
}

#[test]
fn weight_orders_before_the_other_keys() {
    let weights = |r: &Resource| match r.name() {
        "x" => 10,
        _ => 5,
    };
    let mut resources = vec![
        res("apps/v1", "Deployment", Some("prod"), "x", "c"),
        res("apps/v1", "Deployment", Some("prod"), "b", "c"),
        res("apps/v1", "Deployment", Some("prod"), "a", "c"),
    ];
    sort_resources_by(&mut resources, weights);
    assert_eq!(
        keys(&resources),
        ["Deployment/prod/a", "Deployment/prod/b", "Deployment/prod/x"]
    );
}

#[test]
fn ties_are_broken_by_group_kind_namespace_name() {
    let mut resources = vec![
        res("v1", "Service", Some("b"), "s", "c"),
        res("apps/v1", "Service", Some("a"), "s", "c"),
        res("v1", "Service", Some("a"), "z", "c"),
        res("v1", "Secret", Some("z"), "s", "c"),
        res("v1", "Service", Some("a"), "a", "c"),
    ];
    sort_resources_by(&mut resources, |_| 0);
    let order: Vec<String> = resources
        .iter()
        .map(|r| format!("{}|{}|{}|{}", r.group(), r.kind(), r.namespace(), r.name()))
        .collect();
    assert_eq!(
        order,
        [
            "|Secret|z|s",
            "|Service|a|a",
            "|Service|a|z",
            "|Service|b|s",
            "apps|Service|a|s",
        ]
    );
}

#[test]
fn equal_keys_keep_input_order() {
    let mut resources = vec![
        res("v1", "ConfigMap", Some("prod"), "cfg", "first"),
        res("v1", "ConfigMap", Some("prod"), "cfg", "second"),
        res("v1", "ConfigMap", Some("prod"), "cfg", "third"),
    ];
    sort_resources(&mut resources);
    let components: Vec<_> = resources.iter().map(Resource::component).collect();
    assert_eq!(components, ["first", "second", "third"]);
}

#[test]
fn kind_weights_put_dependencies_first() {
    let mut resources = vec![
        res("admissionregistration.k8s.io/v1", "ValidatingWebhookConfiguration", None, "hook", "c"),
        res("example.com/v1", "Widget", Some("prod"), "w", "c"),
        res("networking.k8s.io/v1", "Ingress", Some("prod"), "web", "c"),
        res("apps/v1", "Deployment", Some("prod"), "web", "c"),
        res("v1", "Service", Some("prod"), "web", "c"),
        res("v1", "ConfigMap", Some("prod"), "web", "c"),
        res("rbac.authorization.k8s.io/v1", "RoleBinding", Some("prod"), "web", "c"),
        res("v1", "ServiceAccount", Some("prod"), "web", "c"),
        res("v1", "Namespace", None, "prod", "c"),
        res("apiextensions.k8s.io/v1", "CustomResourceDefinition", None, "widgets", "c"),
    ];
    sort_resources(&mut resources);
    let kinds: Vec<_> = resources.iter().map(Resource::kind).collect();
    assert_eq!(
        kinds,
        [
            "CustomResourceDefinition",
            "Namespace",
            "ServiceAccount",
            "RoleBinding",
            "ConfigMap",
            "Service",
            "Deployment",
            "Ingress",
            "Widget",
            "ValidatingWebhookConfiguration",
        ]
    );
    assert_eq!(kind_weight("Widget"), DEFAULT_WEIGHT);
}

#[test]
fn sorting_is_independent_of_input_order() {
    let make = || {
        vec![
            res("apps/v1", "Deployment", Some("prod"), "web", "c"),
            res("v1", "Service", Some("prod"), "web", "c"),
            res("v1", "Namespace", None, "prod", "c"),
            res("v1", "Service", Some("prod"), "api", "c"),
        ]
    };
    let mut forward = make();
    let mut backward = make();
    backward.reverse();
    sort_resources(&mut forward);
    sort_resources(&mut backward);
    assert_eq!(forward, backward);
}
