use crate::foundation::core::Labels;
use crate::foundation::error::LoadError;
use crate::provider::predicate::PredicateExpr;
use crate::provider::transformer::{
    Generate, MatchStrategy, Provider, TemplateGenerator, Transformer,
};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Supplies a [`Provider`] for a provider reference.
pub trait ProviderLoader {
    /// Load provider `reference`.
    fn load(&self, reference: &str) -> Result<Provider, LoadError>;
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ProviderDef {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    transformers: Vec<TransformerDef>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct TransformerDef {
    fqn: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    required_labels: Labels,
    #[serde(default)]
    required_resources: BTreeSet<String>,
    #[serde(default)]
    required_traits: BTreeSet<String>,
    #[serde(default)]
    optional_traits: BTreeSet<String>,
    #[serde(default)]
    predicate: Option<PredicateExpr>,
    #[serde(default)]
    template: Option<Value>,
}

impl TransformerDef {
    fn into_transformer(self) -> Transformer {
        let strategy = match self.predicate {
            Some(expr) => MatchStrategy::Predicate(Arc::new(expr)),
            None => MatchStrategy::Structural,
        };
        let generator: Option<Arc<dyn Generate>> = match self.template {
            Some(t) => Some(Arc::new(TemplateGenerator::new(self.fqn.clone(), t))),
            None => None,
        };
        Transformer {
            fqn: self.fqn,
            description: self.description,
            required_labels: self.required_labels,
            required_resources: self.required_resources,
            required_traits: self.required_traits,
            optional_traits: self.optional_traits,
            strategy,
            generator,
        }
    }
}

/// Parse a provider definition from a JSON reader.
pub fn provider_from_reader<R: std::io::Read>(r: R, location: &str) -> Result<Provider, LoadError> {
    let def: ProviderDef = serde_json::from_reader(r)
        .map_err(|e| LoadError::new(location, format!("parse provider JSON: {e}")))?;
    if def.name.trim().is_empty() {
        return Err(LoadError::new(location, "provider name must be non-empty"));
    }
    let mut seen = BTreeSet::new();
    for t in &def.transformers {
        if t.fqn.trim().is_empty() {
            return Err(LoadError::new(location, "transformer fqn must be non-empty"));
        }
        if !seen.insert(t.fqn.as_str()) {
            return Err(LoadError::new(
                location,
                format!("duplicate transformer {}", t.fqn),
            ));
        }
    }
    Ok(Provider {
        name: def.name,
        version: def.version,
        transformers: def
            .transformers
            .into_iter()
            .map(TransformerDef::into_transformer)
            .collect(),
    })
}

/// Loads providers from `<dir>/<reference>.json`.
#[derive(Clone, Debug)]
pub struct FsProviderLoader {
    dir: PathBuf,
}

impl FsProviderLoader {
    /// Loader reading provider files from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ProviderLoader for FsProviderLoader {
    #[tracing::instrument(skip(self))]
    fn load(&self, reference: &str) -> Result<Provider, LoadError> {
        if reference.is_empty() || reference.contains(['/', '\\']) || reference.starts_with('.') {
            return Err(LoadError::new(reference, "invalid provider reference"));
        }
        let path: PathBuf = self.dir.join(format!("{reference}.json"));
        let location = path.display().to_string();
        let f = File::open(&path).map_err(|e| LoadError::new(&location, format!("open: {e}")))?;
        let provider = provider_from_reader(BufReader::new(f), &location)?;
        tracing::debug!(
            name = %provider.name,
            transformers = provider.transformers.len(),
            "loaded provider"
        );
        Ok(provider)
    }
}

/// In-memory providers keyed by name.
#[derive(Clone, Debug, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Provider>,
}

impl ProviderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under its own name, replacing any previous one.
    pub fn register(&mut self, provider: Provider) {
        self.providers.insert(provider.name.clone(), provider);
    }

    /// Register every `*.json` provider file in `dir`.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, LoadError> {
        let dir = dir.as_ref();
        let location = dir.display().to_string();
        let entries = std::fs::read_dir(dir)
            .map_err(|e| LoadError::new(&location, format!("read dir: {e}")))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| LoadError::new(&location, format!("read dir: {e}")))?
                .path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();
        for path in &paths {
            let loc = path.display().to_string();
            let f = File::open(path).map_err(|e| LoadError::new(&loc, format!("open: {e}")))?;
            self.register(provider_from_reader(BufReader::new(f), &loc)?);
        }
        Ok(paths.len())
    }
}

impl ProviderLoader for ProviderRegistry {
    fn load(&self, reference: &str) -> Result<Provider, LoadError> {
        self.providers
            .get(reference)
            .cloned()
            .ok_or_else(|| LoadError::new(reference, "provider not registered"))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/provider/loader.rs"]
mod tests;
