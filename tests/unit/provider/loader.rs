use super::*;
use serde_json::json;

fn provider_json() -> Value {
    json!({
        "name": "kubernetes",
        "version": "1.0.0",
        "transformers": [
            {
                "fqn": "k8s.io/DeploymentTransformer",
                "description": "Deployment per stateless workload",
                "requiredLabels": { "workload-type": "stateless" },
                "requiredResources": ["Container"],
                "optionalTraits": ["Scaling"],
                "template": { "kind": "Deployment" }
            },
            {
                "fqn": "k8s.io/ServiceTransformer",
                "predicate": { "hasTrait": "Expose" }
            }
        ]
    })
}

fn parse(v: Value) -> Result<Provider, LoadError> {
    provider_from_reader(v.to_string().as_bytes(), "mem")
}

#[test]
fn parses_transformers() {
    let p = parse(provider_json()).unwrap();
    assert_eq!(p.name, "kubernetes");
    assert_eq!(p.version.as_deref(), Some("1.0.0"));
    assert_eq!(p.transformers.len(), 2);

    let deploy = &p.transformers[0];
    assert_eq!(deploy.required_labels["workload-type"], "stateless");
    assert!(deploy.required_resources.contains("Container"));
    assert!(deploy.handles_trait("Scaling"));
    assert!(matches!(deploy.strategy, MatchStrategy::Structural));
    assert!(deploy.generator.is_some());

    let svc = &p.transformers[1];
    assert!(matches!(svc.strategy, MatchStrategy::Predicate(_)));
    assert!(svc.generator.is_none());
}

#[test]
fn rejects_invalid_definitions() {
    let err = parse(json!({ "name": " " })).unwrap_err();
    assert_eq!(err.message, "provider name must be non-empty");

    let err = parse(json!({ "name": "p", "transformers": [ { "fqn": "" } ] })).unwrap_err();
    assert_eq!(err.message, "transformer fqn must be non-empty");

    let err = parse(json!({
        "name": "p",
        "transformers": [ { "fqn": "a" }, { "fqn": "a" } ]
    }))
    .unwrap_err();
    assert_eq!(err.message, "duplicate transformer a");

    let err = parse(json!({ "name": "p", "transformers": [ { "fqn": "a", "bogus": 1 } ] }))
        .unwrap_err();
    assert!(err.message.starts_with("parse provider JSON"));
    assert_eq!(err.location, "mem");
}

#[test]
fn registry_serves_registered_providers() {
    let mut reg = ProviderRegistry::new();
    reg.register(parse(provider_json()).unwrap());
    assert_eq!(reg.load("kubernetes").unwrap().transformers.len(), 2);
    let err = reg.load("nomad").unwrap_err();
    assert_eq!(err.to_string(), "nomad: provider not registered");
}

#[test]
fn filesystem_loader_reads_named_files() {
    let dir = PathBuf::from("target").join("unit_provider_loader");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("kubernetes.json"), provider_json().to_string()).unwrap();
    std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

    let loader = FsProviderLoader::new(&dir);
    assert_eq!(loader.load("kubernetes").unwrap().name, "kubernetes");
    assert!(loader.load("missing").unwrap_err().message.starts_with("open"));
    for bad in ["../kubernetes", ".hidden", "a/b", ""] {
        assert_eq!(
            loader.load(bad).unwrap_err().message,
            "invalid provider reference"
        );
    }

    let mut reg = ProviderRegistry::new();
    assert_eq!(reg.load_dir(&dir).unwrap(), 1);
    assert!(reg.load("kubernetes").is_ok());
}
