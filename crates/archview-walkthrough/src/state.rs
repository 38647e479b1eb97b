//! Walkthrough session state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A chosen path of a branch collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchRef {
    pub branch_id: String,
    pub path_id: String,
}

impl BranchRef {
    pub fn new(branch_id: impl Into<String>, path_id: impl Into<String>) -> Self {
        Self {
            branch_id: branch_id.into(),
            path_id: path_id.into(),
        }
    }

    /// `branch_id:path_id`, as stored in `completed_paths`.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BranchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.branch_id, self.path_id)
    }
}

/// The cursor of an active walkthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveStep {
    pub step_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<BranchRef>,
}

impl ActiveStep {
    pub fn new(step_id: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            branch: None,
        }
    }

    pub fn with_branch(mut self, branch: BranchRef) -> Self {
        self.branch = Some(branch);
        self
    }
}

/// Per-session state: cursor plus completion tracking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkthroughState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<ActiveStep>,
    #[serde(default)]
    pub completed_steps: BTreeSet<String>,
    /// `branch_id:path_id` keys.
    #[serde(default)]
    pub completed_paths: BTreeSet<String>,
}

impl WalkthroughState {
    pub fn active_step(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.step_id.as_str())
    }

    pub fn active_branch(&self) -> Option<&BranchRef> {
        self.active.as_ref().and_then(|a| a.branch.as_ref())
    }

    pub fn is_path_complete(&self, branch: &BranchRef) -> bool {
        self.completed_paths.contains(&branch.key())
    }
}

/// Machine phase. `Navigating` and `BranchDecision` are the two active
/// sub-states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Idle,
    Navigating,
    BranchDecision,
}

impl Phase {
    pub fn is_active(self) -> bool {
        !matches!(self, Phase::Idle)
    }
}

/// `(phase, state)` pair the transition function maps over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub state: WalkthroughState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_serializes_camel_case() {
        assert_eq!(
            serde_json::to_string(&Phase::BranchDecision).unwrap(),
            "\"branchDecision\""
        );
        assert!(Phase::Navigating.is_active());
        assert!(!Phase::Idle.is_active());
    }

    #[test]
    fn branch_key() {
        assert_eq!(BranchRef::new("b1", "p2").key(), "b1:p2");
    }
}
