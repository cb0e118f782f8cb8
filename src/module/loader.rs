use crate::foundation::error::LoadError;
use crate::module::model::Module;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Supplies a [`Module`] for a source location.
pub trait ModuleLoader {
    /// Load the module at `location`.
    fn load(&self, location: &str) -> Result<Module, LoadError>;
}

/// Loads modules from the local filesystem.
///
/// `location` may name a module JSON file or a directory containing `module.json`. Relative
/// locations are resolved against `root`.
#[derive(Clone, Debug, Default)]
pub struct FsModuleLoader {
    root: PathBuf,
}

impl FsModuleLoader {
    /// Loader resolving relative locations against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ModuleLoader for FsModuleLoader {
    #[tracing::instrument(skip(self))]
    fn load(&self, location: &str) -> Result<Module, LoadError> {
        let mut path = if Path::new(location).is_absolute() {
            PathBuf::from(location)
        } else {
            self.root.join(location)
        };
        if path.is_dir() {
            path.push("module.json");
        }
        if !path.exists() {
            return Err(LoadError::new(location, "module not found"));
        }
        let module = Module::from_path(&path)?;
        tracing::debug!(
            fqn = %module.metadata.fqn,
            version = %module.metadata.version,
            components = module.components.len(),
            "loaded module"
        );
        Ok(module)
    }
}

/// In-memory modules keyed by location, for embedding and tests.
#[derive(Clone, Debug, Default)]
pub struct ModuleSet {
    modules: HashMap<String, Module>,
}

impl ModuleSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `module` under `location`.
    pub fn insert(&mut self, location: impl Into<String>, module: Module) {
        self.modules.insert(location.into(), module);
    }
}

impl ModuleLoader for ModuleSet {
    fn load(&self, location: &str) -> Result<Module, LoadError> {
        self.modules
            .get(location)
            .cloned()
            .ok_or_else(|| LoadError::new(location, "module not found"))
    }
}
