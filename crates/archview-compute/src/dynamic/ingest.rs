//! Step ingestion.
//!
//! Raw steps arrive in four shapes (single step, series, legacy parallel
//! array, branch collection). They are resolved once into [`StepNode`] so the
//! rest of the resolver works on one tagged variant.

use crate::computed::BranchKind;
use crate::error::ComputeError;
use archview_model::{Fqn, ModelGraph, ViewId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// One interaction between two elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInput {
    pub source: Fqn,
    pub target: Fqn,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigate_to: Option<ViewId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// A response travelling against the call direction (`a <- b`).
    #[serde(default)]
    pub is_backward: bool,
}

impl StepInput {
    pub fn new(source: Fqn, target: Fqn) -> Self {
        Self {
            source,
            target,
            title: None,
            description: None,
            technology: None,
            navigate_to: None,
            notes: None,
            is_backward: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn backward(mut self) -> Self {
        self.is_backward = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPath {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub steps: Vec<RawStep>,
}

impl RawPath {
    pub fn new(steps: Vec<RawStep>) -> Self {
        Self {
            id: None,
            title: None,
            is_default: false,
            steps,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBranch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub kind: BranchKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_path: Option<String>,
    pub paths: Vec<RawPath>,
}

impl RawBranch {
    pub fn new(kind: BranchKind, paths: Vec<RawPath>) -> Self {
        Self {
            id: None,
            kind,
            title: None,
            default_path: None,
            paths,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_default_path(mut self, path: impl Into<String>) -> Self {
        self.default_path = Some(path.into());
        self
    }
}

/// Step input as written by the author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawStep {
    Branch { branch: RawBranch },
    Series { series: Vec<RawStep> },
    /// Legacy parallel array: every member is one path.
    Parallel { parallel: Vec<RawStep> },
    Step(StepInput),
}

impl RawStep {
    pub fn series(steps: Vec<RawStep>) -> Self {
        Self::Series { series: steps }
    }

    pub fn parallel(paths: Vec<RawStep>) -> Self {
        Self::Parallel { parallel: paths }
    }

    pub fn branch(branch: RawBranch) -> Self {
        Self::Branch { branch }
    }
}

impl From<StepInput> for RawStep {
    fn from(step: StepInput) -> Self {
        Self::Step(step)
    }
}

impl From<RawBranch> for RawStep {
    fn from(branch: RawBranch) -> Self {
        Self::Branch { branch }
    }
}

/// Resolved step structure.
#[derive(Debug, Clone, PartialEq)]
pub enum StepNode {
    Step(StepInput),
    Series(Vec<StepNode>),
    Branch(BranchNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BranchNode {
    pub id: String,
    pub kind: BranchKind,
    pub title: Option<String>,
    pub default_path_id: Option<String>,
    pub paths: Vec<PathNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathNode {
    pub id: String,
    pub index: usize,
    pub title: Option<String>,
    pub is_default: bool,
    pub steps: Vec<StepNode>,
}

impl StepNode {
    /// Drop every step `keep` rejects, at any depth.
    pub fn retain_steps(nodes: Vec<StepNode>, keep: &impl Fn(&StepInput) -> bool) -> Vec<StepNode> {
        nodes
            .into_iter()
            .filter_map(|node| match node {
                StepNode::Step(step) => keep(&step).then_some(StepNode::Step(step)),
                StepNode::Series(inner) => Some(StepNode::Series(Self::retain_steps(inner, keep))),
                StepNode::Branch(mut branch) => {
                    for path in &mut branch.paths {
                        path.steps = Self::retain_steps(std::mem::take(&mut path.steps), keep);
                    }
                    Some(StepNode::Branch(branch))
                }
            })
            .collect()
    }
}

/// Resolve raw steps, validating endpoints and branch ids.
pub fn ingest(view: &ViewId, graph: &ModelGraph, raw: &[RawStep]) -> Result<Vec<StepNode>, ComputeError> {
    let mut ingestor = Ingestor {
        view,
        graph,
        parallel_count: 0,
        branch_count: 0,
        branch_ids: HashSet::new(),
    };
    ingestor.sequence(raw)
}

struct Ingestor<'a> {
    view: &'a ViewId,
    graph: &'a ModelGraph,
    parallel_count: usize,
    branch_count: usize,
    branch_ids: HashSet<String>,
}

impl Ingestor<'_> {
    fn sequence(&mut self, raw: &[RawStep]) -> Result<Vec<StepNode>, ComputeError> {
        raw.iter().map(|step| self.node(step)).collect()
    }

    fn node(&mut self, raw: &RawStep) -> Result<StepNode, ComputeError> {
        match raw {
            RawStep::Step(step) => {
                for endpoint in [&step.source, &step.target] {
                    if !self.graph.contains(endpoint) {
                        return Err(ComputeError::UnknownElement {
                            view: self.view.clone(),
                            fqn: endpoint.clone(),
                        });
                    }
                }
                Ok(StepNode::Step(step.clone()))
            }
            RawStep::Series { series } => Ok(StepNode::Series(self.sequence(series)?)),
            RawStep::Parallel { parallel } => self.legacy_parallel(parallel),
            RawStep::Branch { branch } => self.branch(branch),
        }
    }

    fn claim(&mut self, id: &str) -> Result<(), ComputeError> {
        if self.branch_ids.insert(id.to_string()) {
            Ok(())
        } else {
            Err(ComputeError::DuplicateBranch {
                view: self.view.clone(),
                branch: id.to_string(),
            })
        }
    }

    fn legacy_parallel(&mut self, members: &[RawStep]) -> Result<StepNode, ComputeError> {
        self.parallel_count += 1;
        let id = format!("parallel-{}", self.parallel_count);
        self.claim(&id)?;
        let mut paths = Vec::with_capacity(members.len());
        for (index, member) in members.iter().enumerate() {
            let steps = match member {
                RawStep::Series { series } => self.sequence(series)?,
                other => vec![self.node(other)?],
            };
            paths.push(PathNode {
                id: format!("{id}-path-{}", index + 1),
                index,
                title: None,
                is_default: false,
                steps,
            });
        }
        Ok(StepNode::Branch(BranchNode {
            id,
            kind: BranchKind::Parallel,
            title: None,
            default_path_id: None,
            paths,
        }))
    }

    fn branch(&mut self, raw: &RawBranch) -> Result<StepNode, ComputeError> {
        let id = match &raw.id {
            Some(id) => id.clone(),
            None => {
                self.branch_count += 1;
                format!("branch-{}", self.branch_count)
            }
        };
        self.claim(&id)?;

        let mut path_ids = HashSet::new();
        let mut paths = Vec::with_capacity(raw.paths.len());
        for (index, path) in raw.paths.iter().enumerate() {
            let path_id = path
                .id
                .clone()
                .unwrap_or_else(|| format!("{id}-path-{}", index + 1));
            if !path_ids.insert(path_id.clone()) {
                return Err(ComputeError::DuplicateBranch {
                    view: self.view.clone(),
                    branch: format!("{id}/{path_id}"),
                });
            }
            paths.push(PathNode {
                id: path_id,
                index,
                title: path.title.clone(),
                is_default: path.is_default,
                steps: self.sequence(&path.steps)?,
            });
        }

        let default_path_id = match &raw.default_path {
            Some(default) if path_ids.contains(default) => Some(default.clone()),
            Some(default) => {
                debug!(view = %self.view, branch = %id, path = %default, "default path not declared, ignored");
                None
            }
            None => None,
        };

        Ok(StepNode::Branch(BranchNode {
            id,
            kind: raw.kind,
            title: raw.title.clone(),
            default_path_id,
            paths,
        }))
    }
}
