//! Render-ready output of view computation.

use crate::view::{AutoLayout, ViewKind};
use archview_model::{ArrowType, ElementStyle, Fqn, LineStyle, Link, RelationId, ViewId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// Edge identifier: `source:target` for element and deployment views, the
/// step id for dynamic views.
pub type EdgeId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedNode {
    pub id: Fqn,
    pub kind: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    #[serde(default)]
    pub style: ElementStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigate_to: Option<ViewId>,
    /// Referenced model element, for deployment instances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_ref: Option<Fqn>,
    /// Closest ancestor present in the view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Fqn>,
    #[serde(default)]
    pub children: Vec<Fqn>,
    /// Number of in-view ancestors.
    pub level: usize,
    /// Height of the in-view subtree below this node (0 for leaves).
    pub depth: usize,
    #[serde(default)]
    pub in_edges: Vec<EdgeId>,
    #[serde(default)]
    pub out_edges: Vec<EdgeId>,
}

impl ComputedNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedEdge {
    pub id: EdgeId,
    pub source: Fqn,
    pub target: Fqn,
    /// Closest common ancestor present in the view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Fqn>,
    #[serde(default)]
    pub relations: Vec<RelationId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<ArrowType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail: Option<ArrowType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigate_to: Option<ViewId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Dynamic views: a response drawn against the call direction.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_backward: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchKind {
    /// Exactly one path is taken.
    #[default]
    Alternate,
    /// Every path runs.
    Parallel,
}

/// One hop of the nesting chain a step lives in, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchTrail {
    pub branch_id: String,
    pub path_id: String,
    pub path_index: usize,
    pub kind: BranchKind,
}

/// A flattened step of a dynamic view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedStep {
    pub id: String,
    pub source: Fqn,
    pub target: Fqn,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_backward: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branch_trail: Vec<BranchTrail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchPath {
    pub path_id: String,
    pub path_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub is_default_path: bool,
    /// The path's own steps; steps of nested branches are not listed.
    pub step_ids: Vec<String>,
    /// First step in linear order, nested branches included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_step_id: Option<String>,
}

impl BranchPath {
    /// Where a walkthrough lands when this path is chosen.
    pub fn entry_step(&self) -> Option<&str> {
        self.first_step_id
            .as_deref()
            .or_else(|| self.step_ids.first().map(String::as_str))
    }
}

/// A decision point of a dynamic view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchCollection {
    pub branch_id: String,
    pub kind: BranchKind,
    pub decision_step_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_path_id: Option<String>,
    pub paths: Vec<BranchPath>,
}

impl BranchCollection {
    pub fn path(&self, path_id: &str) -> Option<&BranchPath> {
        self.paths.iter().find(|p| p.path_id == path_id)
    }
}

/// A fully resolved view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedView {
    pub id: ViewId,
    pub kind: ViewKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_of: Option<Fqn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_layout: Option<AutoLayout>,
    pub nodes: Vec<ComputedNode>,
    pub edges: Vec<ComputedEdge>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<ComputedStep>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branch_collections: Vec<BranchCollection>,
}

impl ComputedView {
    pub fn node(&self, id: &Fqn) -> Option<&ComputedNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&ComputedEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Hex SHA-256 of the canonical JSON form. Structurally equal views
    /// have equal fingerprints.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}
