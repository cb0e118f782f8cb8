use super::*;
use crate::foundation::core::Labels;
use serde_json::json;
use uuid::Uuid;

fn ctx(component: &str) -> TransformContext {
    let mut labels = Labels::new();
    labels.insert("tier".to_string(), "frontend".to_string());
    TransformContext {
        release_name: "blog".to_string(),
        namespace: "prod".to_string(),
        release_uuid: Uuid::nil(),
        release_labels: Labels::new(),
        module_name: "blog".to_string(),
        module_version: "1.0.0".to_string(),
        component_name: component.to_string(),
        component_labels: labels,
        component_annotations: Labels::new(),
    }
}

#[test]
fn templates_are_compiled_once_per_key() {
    let mut eval = EvalContext::new();
    let tpl = json!({
        "kind": "ConfigMap",
        "metadata": { "name": "${context.componentName}", "labels": { "$ref": "context.componentLabels" } },
        "data": { "size": "${spec.size}" }
    });

    let a = eval
        .render_template("t1", &tpl, &json!({ "size": 1 }), &ctx("a"))
        .unwrap();
    let b = eval
        .render_template("t1", &tpl, &json!({ "size": 2 }), &ctx("b"))
        .unwrap();

    assert_eq!(a["metadata"]["name"], json!("a"));
    assert_eq!(a["metadata"]["labels"], json!({ "tier": "frontend" }));
    assert_eq!(b["data"]["size"], json!(2));
    assert_eq!(
        eval.stats(),
        EvalStats {
            evaluations: 2,
            compiled: 1,
            cache_hits: 1,
        }
    );
}

#[test]
fn omitted_template_yields_empty_object() {
    let mut eval = EvalContext::new();
    let out = eval
        .render_template(
            "t",
            &json!({ "$if": "spec.enabled", "then": { "kind": "Service" } }),
            &json!({ "enabled": false }),
            &ctx("web"),
        )
        .unwrap();
    assert_eq!(out, json!({}));
}

#[test]
fn compile_errors_are_not_cached() {
    let mut eval = EvalContext::new();
    let bad = json!({ "$ref": 1 });
    assert!(eval.render_template("t", &bad, &json!({}), &ctx("web")).is_err());
    assert!(eval.render_template("t", &bad, &json!({}), &ctx("web")).is_err());
    assert_eq!(eval.stats().compiled, 0);
    assert_eq!(eval.stats().evaluations, 0);
}

#[test]
fn reused_key_with_different_template_recompiles() {
    let mut eval = EvalContext::new();
    let config = json!({ "kind": "ConfigMap", "metadata": { "name": "x" } });
    let secret = json!({ "kind": "Secret", "metadata": { "name": "x" } });

    let a = eval
        .render_template("t", &config, &json!({}), &ctx("web"))
        .unwrap();
    let b = eval
        .render_template("t", &secret, &json!({}), &ctx("web"))
        .unwrap();
    let c = eval
        .render_template("t", &secret, &json!({}), &ctx("web"))
        .unwrap();

    assert_eq!(a["kind"], json!("ConfigMap"));
    assert_eq!(b["kind"], json!("Secret"));
    assert_eq!(c["kind"], json!("Secret"));
    assert_eq!(
        eval.stats(),
        EvalStats {
            evaluations: 3,
            compiled: 2,
            cache_hits: 1,
        }
    );
}
