//! Transformer execution and output decoding.

pub(crate) mod decode;
pub(crate) mod executor;
pub(crate) mod resource;
