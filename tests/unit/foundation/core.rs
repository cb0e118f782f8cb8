use super::*;
use serde_json::json;

#[test]
fn value_path_parses_fields_and_indices() {
    let p = ValuePath::parse("web.ports[0].name").unwrap();
    assert_eq!(
        p.elems(),
        &[
            PathElem::Field("web".to_string()),
            PathElem::Field("ports".to_string()),
            PathElem::Index(0),
            PathElem::Field("name".to_string()),
        ]
    );
    assert_eq!(p.to_string(), "web.ports[0].name");
}

#[test]
fn value_path_rejects_malformed_input() {
    assert!(ValuePath::parse("").is_none());
    assert!(ValuePath::parse("a..b").is_none());
    assert!(ValuePath::parse("a[x]").is_none());
    assert!(ValuePath::parse("a[0").is_none());
    assert!(ValuePath::parse("a[0]b").is_none());
}

#[test]
fn value_path_root_and_parent() {
    let root = ValuePath::root();
    assert!(root.is_root());
    assert_eq!(root.to_string(), "<root>");
    assert!(root.parent().is_none());

    let p = root.field("a").index(2);
    assert_eq!(p.to_string(), "a[2]");
    assert_eq!(p.parent(), Some(root.field("a")));
    assert!(p.starts_with(&root.field("a")));
    assert!(!root.field("a").starts_with(&p));
    assert_eq!(p.head_field(), Some("a"));
    assert_eq!(p.strip_prefix(1).elems(), &[PathElem::Index(2)]);
}

#[test]
fn lookup_walks_objects_and_arrays() {
    let v = json!({ "web": { "ports": [ { "name": "http" } ] } });
    let p = ValuePath::parse("web.ports[0].name").unwrap();
    assert_eq!(lookup(&v, &p), Some(&json!("http")));
    assert_eq!(lookup(&v, &ValuePath::parse("web.ports[3]").unwrap()), None);
    assert_eq!(lookup(&v, &ValuePath::parse("web[0]").unwrap()), None);
    assert_eq!(lookup(&v, &ValuePath::root()), Some(&v));
}

#[test]
fn dns_label_rules() {
    assert!(is_dns_label("web"));
    assert!(is_dns_label("web-1"));
    assert!(is_dns_label("0abc"));
    assert!(!is_dns_label(""));
    assert!(!is_dns_label("-web"));
    assert!(!is_dns_label("web-"));
    assert!(!is_dns_label("Web"));
    assert!(!is_dns_label("web_1"));
    assert!(!is_dns_label(&"a".repeat(64)));
    assert!(is_dns_label(&"a".repeat(63)));
}

#[test]
fn phase_display_is_lowercase() {
    assert_eq!(Phase::Preparation.to_string(), "preparation");
    assert_eq!(Phase::Generate.to_string(), "generate");
}

#[test]
fn cancel_token_is_shared_between_clones() {
    let token = CancelToken::new();
    let other = token.clone();
    assert!(token.check().is_ok());
    other.cancel();
    assert!(token.is_cancelled());
    assert_eq!(token.check(), Err(Cancelled));
}
