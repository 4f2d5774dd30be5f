//! Engine error types

use thiserror::Error;

/// Errors surfaced by the engine and its loaders
#[derive(Error, Debug)]
pub enum EngineError {
    /// Boost identifier not recognized
    #[error("unknown boost id: {0}")]
    UnknownBoost(String),

    /// Level data failed validation
    #[error("invalid level: {0}")]
    InvalidLevel(String),

    /// Settings failed validation
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Player has none of this boost left
    #[error("no {0} boosts left")]
    BoostUnavailable(String),

    /// Boost was used too recently
    #[error("boost {id} on cooldown for {remaining_ms} ms")]
    BoostOnCooldown {
        /// Boost identifier
        id: String,
        /// Time until the boost is usable again
        remaining_ms: u64,
    },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
