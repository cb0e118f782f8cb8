//! Per-render evaluation context and the JSON output-template engine used by declarative
//! transformers.

pub(crate) mod context;
pub(crate) mod template;
