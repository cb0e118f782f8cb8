use crate::foundation::core::Labels;
use crate::foundation::error::LoadError;
use crate::module::schema::Schema;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Identity metadata of a module.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleMetadata {
    /// Short module name.
    pub name: String,
    /// Fully-qualified module name, e.g. `example.com/modules/blog@v1`.
    pub fqn: String,
    /// Module version.
    pub version: String,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Namespace used when a release does not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_namespace: Option<String>,
}

/// Component declaration inside a module, before values are bound.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ComponentDef {
    /// Component labels.
    #[serde(default)]
    pub labels: Labels,
    /// Component annotations.
    #[serde(default)]
    pub annotations: Labels,
    /// Resource capabilities keyed by FQN; values are optional spec default fragments.
    #[serde(default)]
    pub resources: BTreeMap<String, Value>,
    /// Trait capabilities keyed by FQN; values are optional spec default fragments.
    #[serde(default)]
    pub traits: BTreeMap<String, Value>,
    /// Component spec, possibly referencing release values.
    #[serde(default)]
    pub spec: Value,
}

/// A versioned application description: value schema, defaults and components.
///
/// Modules are immutable once loaded; binding them to values produces a
/// [`crate::Release`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Module identity.
    pub metadata: ModuleMetadata,
    /// Closed value schema (no defaults).
    #[serde(default = "Schema::empty_struct")]
    pub schema: Schema,
    /// Default values, unified beneath user overlays.
    #[serde(default)]
    pub values: Value,
    /// Components keyed by name.
    #[serde(default)]
    pub components: BTreeMap<String, ComponentDef>,
    /// Where the module was loaded from, used to attribute schema errors.
    #[serde(skip)]
    pub source: Option<String>,
}

impl Module {
    /// Parse a module from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R, location: &str) -> Result<Self, LoadError> {
        let mut module: Module = serde_json::from_reader(r)
            .map_err(|e| LoadError::new(location, format!("parse module JSON: {e}")))?;
        module.check_metadata(location)?;
        module.source = Some(location.to_string());
        Ok(module)
    }

    /// Parse a module from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let location = path.display().to_string();
        let f = File::open(path).map_err(|e| LoadError::new(&location, format!("open: {e}")))?;
        Self::from_reader(BufReader::new(f), &location)
    }

    fn check_metadata(&self, location: &str) -> Result<(), LoadError> {
        let m = &self.metadata;
        for (field, v) in [("name", &m.name), ("fqn", &m.fqn), ("version", &m.version)] {
            if v.trim().is_empty() {
                return Err(LoadError::new(
                    location,
                    format!("metadata.{field} must be non-empty"),
                ));
            }
        }
        Ok(())
    }
}
