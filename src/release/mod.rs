//! Release construction: binding a module to values and a deployment identity.

pub(crate) mod builder;
pub(crate) mod identity;
pub(crate) mod model;
pub(crate) mod resolve;
