use crate::foundation::core::Labels;
use crate::module::model::ModuleMetadata;
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Release identity and labels.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseMetadata {
    /// Release name.
    pub name: String,
    /// Target namespace.
    pub namespace: String,
    /// Deterministic release identity.
    pub uuid: Uuid,
    /// Labels every rendered resource may carry.
    pub labels: Labels,
}

/// One deployable unit of a release, with a fully concrete spec.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Component name, unique within the release.
    pub name: String,
    /// Component labels.
    pub labels: Labels,
    /// Component annotations.
    pub annotations: Labels,
    /// Resource capabilities keyed by FQN.
    pub resources: BTreeMap<String, Value>,
    /// Trait capabilities keyed by FQN.
    pub traits: BTreeMap<String, Value>,
    /// Merged concrete spec.
    pub spec: Value,
}

impl Component {
    /// Read-only view handed to match predicates.
    pub fn descriptor(&self) -> ComponentDescriptor<'_> {
        ComponentDescriptor {
            name: &self.name,
            labels: &self.labels,
            resources: &self.resources,
            traits: &self.traits,
        }
    }
}

/// What a match predicate may inspect about a component: identity and capability keys, never
/// the component spec.
#[derive(Clone, Copy, Debug)]
pub struct ComponentDescriptor<'a> {
    name: &'a str,
    labels: &'a Labels,
    resources: &'a BTreeMap<String, Value>,
    traits: &'a BTreeMap<String, Value>,
}

impl<'a> ComponentDescriptor<'a> {
    /// Component name.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Component labels.
    pub fn labels(&self) -> &'a Labels {
        self.labels
    }

    /// Resource capability FQNs in sorted order.
    pub fn resource_keys(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        self.resources.keys().map(String::as_str)
    }

    /// Trait capability FQNs in sorted order.
    pub fn trait_keys(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        self.traits.keys().map(String::as_str)
    }

    /// Return `true` when the component declares resource `fqn`.
    pub fn has_resource(&self, fqn: &str) -> bool {
        self.resources.contains_key(fqn)
    }

    /// Return `true` when the component declares trait `fqn`.
    pub fn has_trait(&self, fqn: &str) -> bool {
        self.traits.contains_key(fqn)
    }
}

/// A module bound to a release identity and concrete values.
///
/// Built once per render by [`crate::build_release`] and never mutated afterwards; matching and
/// generation only read this snapshot.
#[derive(Clone, Debug)]
pub struct Release {
    pub(crate) metadata: ReleaseMetadata,
    pub(crate) module: ModuleMetadata,
    pub(crate) values: Value,
    pub(crate) components: Vec<Component>,
}

impl Release {
    /// Release identity and labels.
    pub fn metadata(&self) -> &ReleaseMetadata {
        &self.metadata
    }

    /// Metadata of the module this release was built from.
    pub fn module(&self) -> &ModuleMetadata {
        &self.module
    }

    /// Unified, validated values.
    pub fn values(&self) -> &Value {
        &self.values
    }

    /// Components in name order.
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Look up a component by name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }
}
