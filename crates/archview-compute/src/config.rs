//! Compute configuration.
//!
//! Threaded explicitly through every entry point, so one process can compute
//! views under different settings concurrently.

use crate::error::ComputeError;
use serde::{Deserialize, Serialize};

/// Configuration for view computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeConfig {
    /// Emit branch collections and branch trails for dynamic views. When
    /// disabled, parallel/alternate blocks are still flattened in order but
    /// produce no branch metadata.
    pub dynamic_branches: bool,
    /// Run the orphaned-container pruning pass after exclude stages.
    pub prune_after_exclude: bool,
    /// Derive `navigate_to` for nodes from scoped element views in the catalog.
    pub derive_navigate_to: bool,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            dynamic_branches: true,
            prune_after_exclude: true,
            derive_navigate_to: true,
        }
    }
}

impl ComputeConfig {
    /// Settings for consumers that only understand flat step lists.
    pub fn legacy() -> Self {
        Self {
            dynamic_branches: false,
            ..Self::default()
        }
    }

    /// Parse a YAML config document. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ComputeError> {
        serde_yaml::from_str(yaml).map_err(|e| ComputeError::InvalidConfig(e.to_string()))
    }
}
