//! Component-to-transformer matching and unhandled-trait warnings.

pub(crate) mod matching;
pub(crate) mod plan;
pub(crate) mod warnings;
