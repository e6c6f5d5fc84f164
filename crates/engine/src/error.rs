//! Engine error types

use thiserror::Error;

/// Engine-specific errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Construction rejected (lane/transform count mismatch, zero parallelism)
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Transform factory failed for a lane index
    #[error("transform factory failed for lane {lane}: {source}")]
    Factory {
        lane: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The pipeline no longer accepts items (closed, or a lane faulted)
    #[error("engine input closed; pipeline is no longer accepting items")]
    Closed,

    /// A lane worker panicked while applying its transform
    #[error("lane {lane} worker panicked while applying its transform")]
    LanePanic { lane: usize },

    /// The dispatcher or combiner task panicked
    #[error("{stage} task panicked")]
    StagePanic { stage: &'static str },

    /// Contract-level error (from config validation)
    #[error(transparent)]
    Contract(#[from] contracts::ContractError),
}

impl EngineError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
