// ─────────────────────────────────────────────────────────────────────
// Phase-Drift Kernel — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all Phase-Drift Kernel failures.
///
/// Only boundary problems surface here. Capacity overflow is handled by
/// eviction and short histories yield neutral values, so neither has a
/// variant.
#[derive(Error, Debug)]
pub enum DriftError {
    /// A feature or band energy outside [0, 1], or a non-finite value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Caller-supplied timestamp moved backwards.
    #[error("non-monotonic timestamp: {current}ms precedes {previous}ms")]
    NonMonotonicTimestamp { previous: u64, current: u64 },

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Session export could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type DriftResult<T> = Result<T, DriftError>;

impl From<serde_json::Error> for DriftError {
    fn from(err: serde_json::Error) -> Self {
        DriftError::Serialization(err.to_string())
    }
}
