//! Navigation log for deterministic replay.
//!
//! Only accepted events are recorded. Replaying a log over the same
//! [`WalkthroughMeta`] always yields the same [`Snapshot`].

use crate::machine::{transition, Event};
use crate::meta::WalkthroughMeta;
use crate::state::Snapshot;
use archview_model::ViewId;
use serde::{Deserialize, Serialize};

/// An event with its position in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub seq: u64,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationLog {
    pub view_id: ViewId,
    pub events: Vec<RecordedEvent>,
}

impl NavigationLog {
    pub fn new(view_id: ViewId) -> Self {
        Self {
            view_id,
            events: Vec::new(),
        }
    }

    pub fn record(&mut self, event: Event) {
        let seq = self.events.last().map_or(0, |e| e.seq + 1);
        self.events.push(RecordedEvent { seq, event });
    }

    /// Rebuild the snapshot from an idle start.
    pub fn replay(&self, meta: &WalkthroughMeta) -> Snapshot {
        self.replay_to(meta, u64::MAX)
    }

    /// Rebuild the snapshot as it was after event `seq`.
    pub fn replay_to(&self, meta: &WalkthroughMeta, seq: u64) -> Snapshot {
        self.events
            .iter()
            .take_while(|e| e.seq <= seq)
            .fold(Snapshot::default(), |snapshot, e| transition(meta, &snapshot, &e.event))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
