//! Predicate executors.
//!
//! An executor evaluates rule expressions of one view kind against the model
//! graph. Element views use [`ModelExecutor`], deployment views use
//! [`DeploymentExecutor`]. Both are validated up front: an expression naming
//! a missing FQN fails the whole view instead of matching nothing.

mod deployment;
mod element;
mod relation;

pub use deployment::DeploymentExecutor;
pub(crate) use deployment::implements;
pub use element::ModelExecutor;

use crate::error::ComputeError;
use crate::expr::Expr;
use crate::memory::{Connection, ExclusionKey};
use crate::view::ViewKind;
use archview_model::{Fqn, RelationId, ViewId};

/// How an expression acts on the pipeline memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// Selects elements (nodes).
    Elements,
    /// Selects relationships (edges).
    Relations,
}

/// Result of resolving an include expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Elements {
        /// Named by the expression itself; survive pruning.
        explicit: Vec<Fqn>,
        /// Pulled in through a selector.
        implicit: Vec<Fqn>,
    },
    Relations {
        /// Closest elements on either side of every matched relationship.
        endpoints: Vec<Fqn>,
        relations: Vec<RelationId>,
    },
}

impl Resolved {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Elements { explicit, implicit } => explicit.is_empty() && implicit.is_empty(),
            Self::Relations { relations, .. } => relations.is_empty(),
        }
    }
}

/// Evaluates rule expressions for one view.
pub trait PredicateExecutor {
    /// View under computation, for error reporting.
    fn view(&self) -> &ViewId;

    fn kind(&self) -> ViewKind;

    /// Validate `expr` for this view kind and report what it selects.
    fn classify(&self, expr: &Expr) -> Result<Predicate, ComputeError>;

    /// Resolve an include expression. `expr` must have been classified.
    fn include(&self, expr: &Expr) -> Resolved;

    /// Membership test used by exclude and style rules.
    fn matches(&self, expr: &Expr, fqn: &Fqn) -> bool;

    /// True if the relation expression `expr` removes `relation` from `connection`.
    fn matches_relation(&self, expr: &Expr, connection: &Connection, relation: &RelationId)
        -> bool;

    /// How an excluded relationship is remembered.
    fn exclusion_key(&self, relation: &RelationId, connection: &Connection) -> ExclusionKey;
}

/// Collect distinct items, keeping first-seen order.
pub(crate) fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}
