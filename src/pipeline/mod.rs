//! Render orchestration and canonical resource ordering.

pub(crate) mod order;
pub(crate) mod render;
