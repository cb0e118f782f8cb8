use serde_json::{Map, Value};

/// One decoded output object, attributed to the component and transformer that produced it.
///
/// Immutable once produced; decoding guarantees `apiVersion`, `kind` and `metadata.name` are
/// non-empty strings.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    object: Map<String, Value>,
    component: String,
    transformer: String,
}

impl Resource {
    pub(crate) fn new(object: Map<String, Value>, component: &str, transformer: &str) -> Self {
        Self {
            object,
            component: component.to_string(),
            transformer: transformer.to_string(),
        }
    }

    fn str_field(&self, key: &str) -> &str {
        self.object.get(key).and_then(Value::as_str).unwrap_or("")
    }

    fn metadata_field(&self, key: &str) -> Option<&str> {
        self.object
            .get("metadata")
            .and_then(|m| m.get(key))
            .and_then(Value::as_str)
    }

    /// Full manifest object.
    pub fn object(&self) -> &Map<String, Value> {
        &self.object
    }

    /// Consume the resource, returning the manifest object.
    pub fn into_object(self) -> Map<String, Value> {
        self.object
    }

    /// `apiVersion`, e.g. `apps/v1`.
    pub fn api_version(&self) -> &str {
        self.str_field("apiVersion")
    }

    /// API group (`apps` for `apps/v1`, empty for the core group `v1`).
    pub fn group(&self) -> &str {
        match self.api_version().rsplit_once('/') {
            Some((group, _)) => group,
            None => "",
        }
    }

    /// `kind`.
    pub fn kind(&self) -> &str {
        self.str_field("kind")
    }

    /// `metadata.name`.
    pub fn name(&self) -> &str {
        self.metadata_field("name").unwrap_or("")
    }

    /// `metadata.namespace`; empty for cluster-scoped or unset.
    pub fn namespace(&self) -> &str {
        self.metadata_field("namespace").unwrap_or("")
    }

    /// Name of the originating component.
    pub fn component(&self) -> &str {
        &self.component
    }

    /// FQN of the originating transformer.
    pub fn transformer(&self) -> &str {
        &self.transformer
    }
}
