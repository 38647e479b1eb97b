//! Walkthrough navigation machine.
//!
//! ```text
//!            START                 NEXT / SELECT
//!   Idle ───────────► Active ◄──────────────────┐
//!    ▲               ┌───────────────────────┐  │
//!    │   STOP        │ Navigating            │  │
//!    └───────────────│     ⇅                 │──┘
//!                    │ BranchDecision        │
//!                    └───────────────────────┘
//! ```
//!
//! [`transition`] is a pure function over `(Snapshot, Event)`. Events that
//! do not apply in the current phase leave the snapshot untouched.

use crate::log::NavigationLog;
use crate::meta::WalkthroughMeta;
use crate::state::{ActiveStep, BranchRef, Phase, Snapshot, WalkthroughState};
use crate::url;
use archview_compute::ComputedView;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    Start {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step_id: Option<String>,
    },
    Next,
    Previous,
    SelectBranchPath {
        branch_id: String,
        path_id: String,
    },
    Stop,
    MarkComplete {
        step_id: String,
    },
    ResetCompletion,
    SyncFromUrl {
        token: String,
    },
}

impl Event {
    pub fn start() -> Self {
        Self::Start { step_id: None }
    }

    pub fn start_at(step_id: impl Into<String>) -> Self {
        Self::Start {
            step_id: Some(step_id.into()),
        }
    }

    pub fn select(branch_id: impl Into<String>, path_id: impl Into<String>) -> Self {
        Self::SelectBranchPath {
            branch_id: branch_id.into(),
            path_id: path_id.into(),
        }
    }

    pub fn complete(step_id: impl Into<String>) -> Self {
        Self::MarkComplete {
            step_id: step_id.into(),
        }
    }

    pub fn sync(token: impl Into<String>) -> Self {
        Self::SyncFromUrl {
            token: token.into(),
        }
    }
}

/// Next snapshot. Inapplicable events return `snapshot` unchanged.
pub fn transition(meta: &WalkthroughMeta, snapshot: &Snapshot, event: &Event) -> Snapshot {
    apply(meta, snapshot, event).unwrap_or_else(|| snapshot.clone())
}

/// `None` when the event is rejected.
pub(crate) fn apply(meta: &WalkthroughMeta, snapshot: &Snapshot, event: &Event) -> Option<Snapshot> {
    let next = match event {
        Event::Start { step_id } => start(meta, snapshot, step_id.as_deref()),
        Event::Next => next(meta, snapshot),
        Event::Previous => previous(meta, snapshot),
        Event::SelectBranchPath { branch_id, path_id } => {
            select(meta, snapshot, &BranchRef::new(branch_id.as_str(), path_id.as_str()))
        }
        Event::Stop => stop(snapshot),
        Event::MarkComplete { step_id } => mark_complete(meta, snapshot, step_id),
        Event::ResetCompletion => Some(with_state(snapshot, |state| {
            state.completed_steps.clear();
            state.completed_paths.clear();
        })),
        Event::SyncFromUrl { token } => sync_from_url(meta, snapshot, token),
    };
    match &next {
        Some(next) => trace!(view = %meta.view_id, ?event, phase = ?next.phase, "event applied"),
        None => debug!(view = %meta.view_id, ?event, phase = ?snapshot.phase, "event ignored"),
    }
    next
}

fn with_state(snapshot: &Snapshot, f: impl FnOnce(&mut WalkthroughState)) -> Snapshot {
    let mut next = snapshot.clone();
    f(&mut next.state);
    next
}

/// Place the cursor and derive the phase from it.
fn settle(meta: &WalkthroughMeta, snapshot: &Snapshot, step_id: &str, branch: Option<BranchRef>) -> Snapshot {
    let branch = branch.filter(|b| meta.is_valid_ref(step_id, b));
    let phase = if meta.pending_decision(step_id, branch.as_ref()).is_some() {
        Phase::BranchDecision
    } else {
        Phase::Navigating
    };
    let mut next = snapshot.clone();
    next.phase = phase;
    next.state.active = Some(ActiveStep {
        step_id: step_id.to_string(),
        branch,
    });
    next
}

fn start(meta: &WalkthroughMeta, snapshot: &Snapshot, requested: Option<&str>) -> Option<Snapshot> {
    if snapshot.phase.is_active() {
        return None;
    }
    let step_id = requested
        .filter(|s| meta.contains(s))
        .or_else(|| meta.first())?;
    Some(settle(meta, snapshot, step_id, None))
}

fn active(snapshot: &Snapshot) -> Option<&ActiveStep> {
    if snapshot.phase.is_active() {
        snapshot.state.active.as_ref()
    } else {
        None
    }
}

fn next(meta: &WalkthroughMeta, snapshot: &Snapshot) -> Option<Snapshot> {
    let current = active(snapshot)?;
    if snapshot.phase == Phase::BranchDecision {
        let collection = meta.pending_decision(&current.step_id, current.branch.as_ref())?;
        let path = meta.default_path(collection)?;
        let branch = BranchRef::new(collection.branch_id.as_str(), path.path_id.as_str());
        return Some(enter_path(meta, snapshot, &current.step_id, branch));
    }
    let pos = meta.position(&current.step_id)?;
    let step_id = meta.step_ids.get(pos + 1)?;
    Some(settle(meta, snapshot, step_id, current.branch.clone()))
}

fn previous(meta: &WalkthroughMeta, snapshot: &Snapshot) -> Option<Snapshot> {
    let current = active(snapshot)?;
    let pos = meta.position(&current.step_id)?.checked_sub(1)?;
    Some(settle(meta, snapshot, &meta.step_ids[pos], current.branch.clone()))
}

/// Move onto the entry step of `branch`'s path, or stay on the decision
/// step when the path has no steps.
fn enter_path(meta: &WalkthroughMeta, snapshot: &Snapshot, decision: &str, branch: BranchRef) -> Snapshot {
    let entry = meta
        .branch(&branch.branch_id)
        .and_then(|b| b.path(&branch.path_id))
        .and_then(|p| p.entry_step())
        .unwrap_or(decision)
        .to_string();
    settle(meta, snapshot, &entry, Some(branch))
}

fn select(meta: &WalkthroughMeta, snapshot: &Snapshot, choice: &BranchRef) -> Option<Snapshot> {
    let current = active(snapshot)?;
    if !meta.options(&current.step_id).contains(choice) {
        return None;
    }
    Some(enter_path(meta, snapshot, &current.step_id, choice.clone()))
}

fn stop(snapshot: &Snapshot) -> Option<Snapshot> {
    if !snapshot.phase.is_active() {
        return None;
    }
    let mut next = snapshot.clone();
    next.phase = Phase::Idle;
    next.state.active = None;
    Some(next)
}

fn mark_complete(meta: &WalkthroughMeta, snapshot: &Snapshot, step_id: &str) -> Option<Snapshot> {
    if !meta.contains(step_id) {
        return None;
    }
    Some(with_state(snapshot, |state| {
        state.completed_steps.insert(step_id.to_string());
        state.completed_paths = meta.completed_paths(&state.completed_steps).collect();
    }))
}

fn sync_from_url(meta: &WalkthroughMeta, snapshot: &Snapshot, token: &str) -> Option<Snapshot> {
    let decoded = url::decode(token)?;
    if decoded.view_id != meta.view_id || !meta.contains(&decoded.step_id) {
        return None;
    }
    Some(settle(meta, snapshot, &decoded.step_id, decoded.branch))
}

/// A walkthrough session over one dynamic view, logging accepted events.
#[derive(Debug, Clone)]
pub struct Walkthrough {
    meta: WalkthroughMeta,
    snapshot: Snapshot,
    log: NavigationLog,
}

impl Walkthrough {
    pub fn new(meta: WalkthroughMeta) -> Self {
        let log = NavigationLog::new(meta.view_id.clone());
        Self {
            meta,
            snapshot: Snapshot::default(),
            log,
        }
    }

    pub fn from_view(view: &ComputedView) -> Self {
        Self::new(WalkthroughMeta::from_view(view))
    }

    /// Apply `event`. Returns whether it was accepted.
    pub fn send(&mut self, event: Event) -> bool {
        match apply(&self.meta, &self.snapshot, &event) {
            Some(next) => {
                self.snapshot = next;
                self.log.record(event);
                true
            }
            None => false,
        }
    }

    pub fn meta(&self) -> &WalkthroughMeta {
        &self.meta
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn phase(&self) -> Phase {
        self.snapshot.phase
    }

    pub fn state(&self) -> &WalkthroughState {
        &self.snapshot.state
    }

    /// Branch options at the cursor, empty when idle.
    pub fn options(&self) -> Vec<BranchRef> {
        self.snapshot
            .state
            .active_step()
            .map(|step| self.meta.options(step))
            .unwrap_or_default()
    }

    pub fn log(&self) -> &NavigationLog {
        &self.log
    }

    /// Resumable URL token for the current position.
    pub fn url_token(&self) -> String {
        url::encode(&self.meta.view_id, &self.snapshot.state)
    }
}
