use super::*;
use serde_json::json;

fn at() -> ValuePath {
    ValuePath::root().field("components").field("web").field("spec")
}

#[test]
fn whole_value_and_typed_references() {
    let values = json!({ "web": { "replicas": 3, "ports": [80, 443] } });
    let spec = json!({
        "replicas": "${web.replicas}",
        "ports": { "$values": "web.ports" },
        "first": "${web.ports[0]}",
        "static": 7
    });
    let out = resolve_spec(&spec, &values, &at()).unwrap();
    assert_eq!(
        out,
        json!({ "replicas": 3, "ports": [80, 443], "first": 80, "static": 7 })
    );
}

#[test]
fn interpolation_into_text() {
    let values = json!({ "image": { "repo": "nginx", "tag": "1.25" }, "debug": true });
    let spec = json!({ "image": "${image.repo}:${image.tag}", "flag": "debug=${debug}" });
    let out = resolve_spec(&spec, &values, &at()).unwrap();
    assert_eq!(out, json!({ "image": "nginx:1.25", "flag": "debug=true" }));
}

#[test]
fn unset_reference_is_not_concrete() {
    let values = json!({ "web": {} });
    let spec = json!({ "replicas": "${web.replicas}", "ok": 1 });
    let errs = resolve_spec(&spec, &values, &at()).unwrap_err();
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].kind, ValidationKind::NotConcrete);
    assert_eq!(errs[0].path.to_string(), "components.web.spec.replicas");
    assert_eq!(errs[0].detail, "reference to unset value web.replicas");
}

#[test]
fn non_scalar_interpolation_fails() {
    let values = json!({ "ports": [1, 2] });
    let errs = resolve_spec(&json!({ "x": "p=${ports}" }), &values, &at()).unwrap_err();
    assert!(errs[0].detail.contains("non-scalar"), "{:?}", errs[0]);
}

#[test]
fn literal_null_is_not_concrete() {
    let errs = resolve_spec(&json!({ "a": [1, null] }), &json!({}), &at()).unwrap_err();
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].path.to_string(), "components.web.spec.a[1]");
    assert_eq!(errs[0].detail, "no value");
}

#[test]
fn malformed_references_are_reported() {
    let errs = resolve_spec(&json!({ "a": { "$values": 3 } }), &json!({}), &at()).unwrap_err();
    assert_eq!(errs[0].detail, "malformed $values reference");

    let errs = resolve_spec(&json!({ "a": "${oops" }), &json!({}), &at()).unwrap_err();
    assert!(errs[0].detail.contains("unterminated"));
}

#[test]
fn objects_with_extra_keys_are_not_references() {
    let spec = json!({ "$values": "a", "other": 1 });
    let out = resolve_spec(&spec, &json!({ "a": 2 }), &at()).unwrap();
    assert_eq!(out, spec);
}
