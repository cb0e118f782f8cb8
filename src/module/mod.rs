//! Module model: identity, closed value schema, defaults and component declarations.
//!
//! Modules are loaded by an external [`loader::ModuleLoader`] and never mutated; value overlays
//! are unified and validated here before a release is built.

pub(crate) mod loader;
pub(crate) mod model;
pub(crate) mod schema;
pub(crate) mod values;
