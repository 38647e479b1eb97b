//! Flattening of nested step structures into a linear step list.

use super::ingest::{BranchNode, StepInput, StepNode};
use crate::computed::{BranchCollection, BranchPath, BranchTrail, ComputedStep};
use tracing::trace;

/// A flattened step together with the input it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatStep {
    pub step: ComputedStep,
    pub input: StepInput,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flattened {
    pub steps: Vec<FlatStep>,
    /// Outer collections precede the collections nested inside them.
    pub collections: Vec<BranchCollection>,
}

/// Flatten `nodes` in path order. With `branches` unset the steps carry no
/// trail and no collections are produced.
pub fn flatten(nodes: &[StepNode], branches: bool) -> Flattened {
    let mut flattener = Flattener {
        branches,
        steps: Vec::new(),
        slots: Vec::new(),
        trail: Vec::new(),
    };
    let mut direct = Vec::new();
    flattener.sequence(nodes, 0, &mut direct);
    Flattened {
        steps: flattener.steps,
        collections: flattener.slots.into_iter().flatten().collect(),
    }
}

struct Flattener {
    branches: bool,
    steps: Vec<FlatStep>,
    slots: Vec<Option<BranchCollection>>,
    trail: Vec<BranchTrail>,
}

impl Flattener {
    /// `start` is where the enclosing sequence began in `steps`; series are
    /// inlined into the sequence they appear in.
    fn sequence(&mut self, nodes: &[StepNode], start: usize, direct: &mut Vec<String>) {
        for node in nodes {
            match node {
                StepNode::Step(input) => direct.push(self.push(input)),
                StepNode::Series(inner) => self.sequence(inner, start, direct),
                StepNode::Branch(branch) => {
                    let preceding = self
                        .steps
                        .get(start..)
                        .and_then(|emitted| emitted.last())
                        .map(|flat| flat.step.id.clone());
                    self.branch(branch, preceding);
                }
            }
        }
    }

    fn push(&mut self, input: &StepInput) -> String {
        let id = format!("step-{:02}", self.steps.len() + 1);
        let branch_trail = if self.branches {
            self.trail.clone()
        } else {
            Vec::new()
        };
        self.steps.push(FlatStep {
            step: ComputedStep {
                id: id.clone(),
                source: input.source.clone(),
                target: input.target.clone(),
                title: input.title.clone(),
                is_backward: input.is_backward,
                branch_trail,
            },
            input: input.clone(),
        });
        id
    }

    fn branch(&mut self, branch: &BranchNode, preceding: Option<String>) {
        let slot = self.slots.len();
        self.slots.push(None);
        let first = self.steps.len();

        let mut paths = Vec::with_capacity(branch.paths.len());
        for path in &branch.paths {
            self.trail.push(BranchTrail {
                branch_id: branch.id.clone(),
                path_id: path.id.clone(),
                path_index: path.index,
                kind: branch.kind,
            });
            let mut direct = Vec::new();
            let start = self.steps.len();
            self.sequence(&path.steps, start, &mut direct);
            self.trail.pop();
            let first_step_id = self.steps.get(start).map(|flat| flat.step.id.clone());
            paths.push(BranchPath {
                path_id: path.id.clone(),
                path_index: path.index,
                title: path.title.clone(),
                is_default_path: path.is_default,
                step_ids: direct,
                first_step_id,
            });
        }

        if !self.branches {
            return;
        }
        let Some(opening) = self.steps.get(first) else {
            trace!(branch = %branch.id, "branch has no steps, no collection emitted");
            return;
        };
        let decision_step_id = preceding.unwrap_or_else(|| opening.step.id.clone());
        self.slots[slot] = Some(BranchCollection {
            branch_id: branch.id.clone(),
            kind: branch.kind,
            decision_step_id,
            default_path_id: branch.default_path_id.clone(),
            paths,
        });
    }
}
