//! Step-through navigation of computed dynamic views.
//!
//! A [`Walkthrough`] session moves a cursor over the steps of a
//! [`ComputedView`](archview_compute::ComputedView), offers branch choices at
//! decision steps, tracks completed steps and paths, and can be resumed from
//! a URL token (`view:step[:branch:path]`).
//!
//! The machine only sees step ids and branch metadata, never coordinates.
//! Invalid events are ignored, never errors.

mod log;
mod machine;
mod meta;
mod state;
pub mod url;

pub use log::{NavigationLog, RecordedEvent};
pub use machine::{transition, Event, Walkthrough};
pub use meta::WalkthroughMeta;
pub use state::{ActiveStep, BranchRef, Phase, Snapshot, WalkthroughState};
pub use url::{decode, encode, UrlToken};
