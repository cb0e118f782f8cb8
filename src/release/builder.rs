use crate::foundation::core::{ValuePath, is_dns_label};
use crate::module::model::{ComponentDef, Module};
use crate::module::schema::{ValidationError, ValidationKind, validate_values};
use crate::module::values::{ValueSource, deep_merge, unify};
use crate::release::identity::{release_labels, release_uuid};
use crate::release::model::{Component, Release, ReleaseMetadata};
use crate::release::resolve::resolve_spec;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Namespace used when neither the caller nor the module names one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Release construction failed; carries every violation found.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error(
    "release of module {module} failed with {} error(s){}",
    .errors.len(),
    bullet_list(.errors)
)]
pub struct BuildError {
    /// FQN of the module being built.
    pub module: String,
    /// Violations, in discovery order.
    pub errors: Vec<ValidationError>,
}

fn bullet_list(errors: &[ValidationError]) -> String {
    errors.iter().map(|e| format!("\n  - {e}")).collect()
}

/// Bind `module` to value overlays and a release identity.
///
/// Module defaults form the base layer; `overlays` are unified on top in order. The unified
/// values must satisfy the module's closed schema and every component spec must be concrete
/// after reference resolution. On any violation no release is returned.
#[tracing::instrument(
    skip(module, overlays),
    fields(module = %module.metadata.fqn, overlays = overlays.len())
)]
pub fn build_release(
    module: &Module,
    overlays: &[ValueSource],
    release_name: &str,
    namespace: &str,
) -> Result<Release, BuildError> {
    let fail = |errors| BuildError {
        module: module.metadata.fqn.clone(),
        errors,
    };

    let namespace = effective_namespace(module, namespace);
    let mut errors = Vec::new();
    let identity = ValuePath::root().field("release");
    if !is_dns_label(release_name) {
        errors.push(ValidationError::new(
            ValidationKind::InvalidIdentity,
            identity.field("name"),
            format!("\"{release_name}\" is not a valid DNS label"),
        ));
    }
    if !is_dns_label(&namespace) {
        errors.push(ValidationError::new(
            ValidationKind::InvalidIdentity,
            identity.field("namespace"),
            format!("\"{namespace}\" is not a valid DNS label"),
        ));
    }

    let mut layers = Vec::with_capacity(overlays.len() + 1);
    layers.push(ValueSource::new(
        defaults_origin(module),
        module.values.clone(),
    ));
    layers.extend_from_slice(overlays);
    let unified = unify(&layers);
    errors.extend(validate_values(
        &module.schema,
        &unified,
        module.source.as_deref(),
    ));
    // Component specs are only meaningful against valid values.
    if !errors.is_empty() {
        return Err(fail(errors));
    }
    let values = unified.into_value();

    let mut components = Vec::with_capacity(module.components.len());
    for (name, def) in &module.components {
        match build_component(name, def, &values) {
            Ok(c) => components.push(c),
            Err(mut e) => errors.append(&mut e),
        }
    }
    if !errors.is_empty() {
        return Err(fail(errors));
    }

    let uuid = release_uuid(&module.metadata.fqn, release_name, &namespace);
    let labels = release_labels(&module.metadata, release_name, uuid);
    tracing::debug!(%uuid, components = components.len(), "release built");

    Ok(Release {
        metadata: ReleaseMetadata {
            name: release_name.to_string(),
            namespace,
            uuid,
            labels,
        },
        module: module.metadata.clone(),
        values,
        components,
    })
}

fn effective_namespace(module: &Module, namespace: &str) -> String {
    if !namespace.trim().is_empty() {
        return namespace.to_string();
    }
    module
        .metadata
        .default_namespace
        .clone()
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
}

fn defaults_origin(module: &Module) -> String {
    match &module.source {
        Some(src) => format!("{src}#values"),
        None => format!("{} defaults", module.metadata.fqn),
    }
}

fn build_component(
    name: &str,
    def: &ComponentDef,
    values: &Value,
) -> Result<Component, Vec<ValidationError>> {
    let at = ValuePath::root().field("components").field(name);
    let mut errors = Vec::new();
    if !is_dns_label(name) {
        errors.push(ValidationError::new(
            ValidationKind::InvalidComponent,
            at.clone(),
            "component name must be a valid DNS label",
        ));
    }
    if def.resources.is_empty() {
        errors.push(ValidationError::new(
            ValidationKind::InvalidComponent,
            at.clone(),
            "component must declare at least one resource",
        ));
    }

    let resources = resolve_fragments(&def.resources, values, &at.field("resources"), &mut errors);
    let traits = resolve_fragments(&def.traits, values, &at.field("traits"), &mut errors);

    // Capability defaults first (resources, then traits), explicit spec last.
    let mut spec = Value::Object(Map::new());
    for frag in resources.values().chain(traits.values()) {
        deep_merge(&mut spec, frag);
    }
    if !def.spec.is_null() {
        match resolve_spec(&def.spec, values, &at.field("spec")) {
            Ok(s) => deep_merge(&mut spec, &s),
            Err(mut e) => errors.append(&mut e),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(Component {
        name: name.to_string(),
        labels: def.labels.clone(),
        annotations: def.annotations.clone(),
        resources,
        traits,
        spec,
    })
}

fn resolve_fragments(
    frags: &BTreeMap<String, Value>,
    values: &Value,
    at: &ValuePath,
    errors: &mut Vec<ValidationError>,
) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();
    for (fqn, frag) in frags {
        let resolved = if frag.is_null() {
            Value::Object(Map::new())
        } else {
            match resolve_spec(frag, values, &at.field(fqn)) {
                Ok(v) => v,
                Err(mut e) => {
                    errors.append(&mut e);
                    continue;
                }
            }
        };
        out.insert(fqn.clone(), resolved);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/release/builder.rs"]
mod tests;
