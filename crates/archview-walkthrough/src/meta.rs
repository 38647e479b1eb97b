//! Step and branch metadata a walkthrough navigates over.

use crate::state::BranchRef;
use archview_compute::{BranchCollection, BranchPath, ComputedView};
use archview_model::ViewId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Everything the machine needs from a computed dynamic view. No geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkthroughMeta {
    pub view_id: ViewId,
    /// Canonical linear order.
    pub step_ids: Vec<String>,
    pub branches: Vec<BranchCollection>,
}

impl WalkthroughMeta {
    pub fn new(view_id: ViewId, step_ids: Vec<String>, branches: Vec<BranchCollection>) -> Self {
        Self {
            view_id,
            step_ids,
            branches,
        }
    }

    pub fn from_view(view: &ComputedView) -> Self {
        Self::new(
            view.id.clone(),
            view.steps.iter().map(|s| s.id.clone()).collect(),
            view.branch_collections.clone(),
        )
    }

    pub fn position(&self, step_id: &str) -> Option<usize> {
        self.step_ids.iter().position(|s| s == step_id)
    }

    pub fn contains(&self, step_id: &str) -> bool {
        self.position(step_id).is_some()
    }

    pub fn first(&self) -> Option<&str> {
        self.step_ids.first().map(String::as_str)
    }

    pub fn branch(&self, branch_id: &str) -> Option<&BranchCollection> {
        self.branches.iter().find(|b| b.branch_id == branch_id)
    }

    /// Branches deciding at `step_id`, outermost first.
    pub fn decisions_at<'a>(&'a self, step_id: &'a str) -> impl Iterator<Item = &'a BranchCollection> {
        self.branches
            .iter()
            .filter(move |b| b.decision_step_id == step_id)
    }

    /// Paths offered at `step_id`.
    pub fn options(&self, step_id: &str) -> Vec<BranchRef> {
        self.decisions_at(step_id)
            .flat_map(|b| {
                b.paths
                    .iter()
                    .map(move |p| BranchRef::new(b.branch_id.clone(), p.path_id.clone()))
            })
            .collect()
    }

    /// The decision still open at `step_id`: the outermost branch deciding
    /// there that `carried` was not chosen from.
    pub fn pending_decision(
        &self,
        step_id: &str,
        carried: Option<&BranchRef>,
    ) -> Option<&BranchCollection> {
        self.branches.iter().find(|b| {
            b.decision_step_id == step_id
                && !b.paths.is_empty()
                && carried.map_or(true, |r| r.branch_id != b.branch_id)
        })
    }

    /// A reference is valid at `step_id` when the step is the branch's
    /// decision step, the path's entry step or one of the path's own steps.
    pub fn is_valid_ref(&self, step_id: &str, branch: &BranchRef) -> bool {
        let Some(collection) = self.branch(&branch.branch_id) else {
            return false;
        };
        let Some(path) = collection.path(&branch.path_id) else {
            return false;
        };
        collection.decision_step_id == step_id
            || path.entry_step() == Some(step_id)
            || path.step_ids.iter().any(|s| s == step_id)
    }

    /// Path taken when a decision is skipped.
    pub fn default_path<'a>(&self, collection: &'a BranchCollection) -> Option<&'a BranchPath> {
        collection
            .default_path_id
            .as_deref()
            .and_then(|id| collection.path(id))
            .or_else(|| collection.paths.iter().find(|p| p.is_default_path))
            .or_else(|| collection.paths.iter().find(|p| p.path_index == 0))
            .or_else(|| collection.paths.first())
    }

    /// `branch_id:path_id` keys of every path whose own steps are all in
    /// `completed`. Paths without steps never complete.
    pub fn completed_paths<'a>(
        &'a self,
        completed: &'a BTreeSet<String>,
    ) -> impl Iterator<Item = String> + 'a {
        self.branches.iter().flat_map(move |b| {
            b.paths
                .iter()
                .filter(move |p| {
                    !p.step_ids.is_empty() && p.step_ids.iter().all(|s| completed.contains(s))
                })
                .map(move |p| BranchRef::new(b.branch_id.clone(), p.path_id.clone()).key())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archview_compute::BranchKind;
    use pretty_assertions::assert_eq;

    fn path(id: &str, index: usize, steps: &[&str]) -> BranchPath {
        BranchPath {
            path_id: id.into(),
            path_index: index,
            title: None,
            is_default_path: false,
            step_ids: steps.iter().map(|s| s.to_string()).collect(),
            first_step_id: None,
        }
    }

    fn collection(paths: Vec<BranchPath>) -> BranchCollection {
        BranchCollection {
            branch_id: "b1".into(),
            kind: BranchKind::Alternate,
            decision_step_id: "s1".into(),
            default_path_id: None,
            paths,
        }
    }

    fn meta(branches: Vec<BranchCollection>) -> WalkthroughMeta {
        WalkthroughMeta::new(
            ViewId::new("v"),
            vec!["s1".into(), "s2".into(), "s3".into()],
            branches,
        )
    }

    #[test]
    fn default_path_priority() {
        let m = meta(vec![]);
        let mut c = collection(vec![path("p1", 1, &[]), path("p2", 0, &[]), path("p3", 2, &[])]);
        assert_eq!(m.default_path(&c).unwrap().path_id, "p2");

        c.paths[2].is_default_path = true;
        assert_eq!(m.default_path(&c).unwrap().path_id, "p3");

        c.default_path_id = Some("p1".into());
        assert_eq!(m.default_path(&c).unwrap().path_id, "p1");

        let c = collection(vec![path("x", 4, &[]), path("y", 5, &[])]);
        assert_eq!(m.default_path(&c).unwrap().path_id, "x");
    }

    #[test]
    fn references_are_valid_on_decision_and_path_steps() {
        let m = meta(vec![collection(vec![path("p1", 0, &["s2"]), path("p2", 1, &["s3"])])]);
        let p1 = BranchRef::new("b1", "p1");
        assert!(m.is_valid_ref("s1", &p1));
        assert!(m.is_valid_ref("s2", &p1));
        assert!(!m.is_valid_ref("s3", &p1));
        assert!(!m.is_valid_ref("s2", &BranchRef::new("b1", "nope")));
        assert_eq!(m.options("s1").len(), 2);
        assert!(m.options("s2").is_empty());
    }

    #[test]
    fn entry_step_keeps_reference_of_a_path_opening_with_a_branch() {
        let mut outer = collection(vec![path("ok", 0, &["s3"]), path("no", 1, &[])]);
        outer.paths[0].first_step_id = Some("s2".into());
        let inner = BranchCollection {
            branch_id: "b2".into(),
            decision_step_id: "s2".into(),
            ..collection(vec![path("x", 0, &["s2"])])
        };
        let m = meta(vec![outer, inner]);
        let ok = BranchRef::new("b1", "ok");
        assert!(m.is_valid_ref("s2", &ok));
        assert_eq!(m.pending_decision("s2", Some(&ok)).unwrap().branch_id, "b2");
        assert!(m.pending_decision("s2", Some(&BranchRef::new("b2", "x"))).is_none());
        assert_eq!(m.pending_decision("s1", None).unwrap().branch_id, "b1");
        assert!(m.pending_decision("s3", None).is_none());
    }
}
