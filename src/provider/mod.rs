//! Transformers (generation rules), match predicates, and provider catalogs.

pub(crate) mod loader;
pub(crate) mod predicate;
pub(crate) mod transformer;
