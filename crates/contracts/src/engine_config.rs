//! Engine configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};

use crate::ContractError;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of lanes (worker parallelism), fixed after construction
    pub parallelism: usize,

    /// Bounded capacity for every queue in the pipeline; defaults to `parallelism`
    #[serde(default)]
    pub queue_capacity: Option<usize>,
}

impl EngineConfig {
    /// Create a configuration with the default capacity model
    pub fn new(parallelism: usize) -> Self {
        Self {
            parallelism,
            queue_capacity: None,
        }
    }

    /// Capacity used for the global queues and each lane queue pair
    pub fn effective_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(self.parallelism)
    }

    /// Check field-level invariants
    ///
    /// # Errors
    /// Returns a validation error naming the offending field.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.parallelism == 0 {
            return Err(ContractError::config_validation(
                "parallelism",
                "must be at least 1",
            ));
        }
        if self.queue_capacity == Some(0) {
            return Err(ContractError::config_validation(
                "queue_capacity",
                "must be at least 1 when set",
            ));
        }
        Ok(())
    }
}
