//! Error types for placement passes.

use thiserror::Error;

/// Errors returned by the placement engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// Every parameter overflowed without finding a free candidate.
    #[error("placement search exhausted after {evaluations} candidates")]
    Exhausted {
        /// Number of candidates evaluated before giving up.
        evaluations: u64,
    },
}

impl PlacementError {
    /// Creates a new `Exhausted` error.
    #[must_use]
    pub const fn exhausted(evaluations: u64) -> Self {
        Self::Exhausted { evaluations }
    }
}
