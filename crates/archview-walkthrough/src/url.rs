//! URL token codec.
//!
//! `<view>:<step>` or `<view>:<step>:<branch>:<path>`. Segments are opaque;
//! anything past the fourth is ignored.

use crate::state::{BranchRef, WalkthroughState};
use archview_model::ViewId;
use serde::{Deserialize, Serialize};
use std::fmt;

const SEPARATOR: char = ':';

/// Decoded walkthrough position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlToken {
    pub view_id: ViewId,
    pub step_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<BranchRef>,
}

impl fmt::Display for UrlToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.view_id, self.step_id)?;
        if let Some(branch) = &self.branch {
            write!(f, "{SEPARATOR}{}{SEPARATOR}{}", branch.branch_id, branch.path_id)?;
        }
        Ok(())
    }
}

/// Token for `state` in `view_id`. An idle state encodes to the bare view id.
pub fn encode(view_id: &ViewId, state: &WalkthroughState) -> String {
    match &state.active {
        None => view_id.to_string(),
        Some(active) => UrlToken {
            view_id: view_id.clone(),
            step_id: active.step_id.clone(),
            branch: active.branch.clone(),
        }
        .to_string(),
    }
}

/// Parse a token. `None` when there is no step position in it.
pub fn decode(token: &str) -> Option<UrlToken> {
    let mut segments = token.split(SEPARATOR);
    let view_id = segments.next().filter(|s| !s.is_empty())?;
    let step_id = segments.next().filter(|s| !s.is_empty())?;
    let branch = match (segments.next(), segments.next()) {
        (Some(branch), Some(path)) if !branch.is_empty() && !path.is_empty() => {
            Some(BranchRef::new(branch, path))
        }
        _ => None,
    };
    Some(UrlToken {
        view_id: ViewId::new(view_id),
        step_id: step_id.to_string(),
        branch,
    })
}
