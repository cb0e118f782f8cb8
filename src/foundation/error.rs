use crate::foundation::core::Phase;
use crate::release::builder::BuildError;

/// Convenience result type used across Platen.
pub type PlatenResult<T> = Result<T, PlatenError>;

/// Top-level error taxonomy for fatal pipeline failures.
///
/// Recoverable failures (unmatched components, transform errors) never surface here; they are
/// aggregated into [`crate::RenderResult::errors`].
#[derive(thiserror::Error, Debug)]
pub enum PlatenError {
    /// Release values or identity failed validation against the module.
    #[error("validation error: {0}")]
    Validation(#[from] BuildError),

    /// A module, provider or value source could not be loaded.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// Cooperative cancellation was observed.
    #[error("render cancelled during {0}")]
    Cancelled(Phase),
}

impl PlatenError {
    /// Return `true` when this error reports a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Failure to load an external input (module, provider, or value file).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{location}: {message}")]
pub struct LoadError {
    /// Path or reference that was being loaded.
    pub location: String,
    /// Human-readable failure detail.
    pub message: String,
}

impl LoadError {
    /// Build a load error for `location`.
    pub fn new(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
