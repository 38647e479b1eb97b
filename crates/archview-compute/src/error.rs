//! Compute error types.

use crate::view::ViewKind;
use archview_model::{Fqn, ViewId};
use thiserror::Error;

/// Errors that fail the computation of one view.
///
/// A failing view never affects any other view of the same model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputeError {
    /// A rule or step references an element that does not exist.
    #[error("view '{view}': unknown element '{fqn}'")]
    UnknownElement { view: ViewId, fqn: Fqn },

    /// A rule references a deployment element that does not exist.
    #[error("view '{view}': unknown deployment element '{fqn}'")]
    UnknownDeployment { view: ViewId, fqn: Fqn },

    /// An expression cannot be used in this kind of view.
    #[error("view '{view}': expression '{expr}' is not allowed in {kind:?} views")]
    ExpressionKindMismatch {
        view: ViewId,
        kind: ViewKind,
        expr: String,
    },

    /// Two branch collections (or two paths of one branch) share an id.
    #[error("view '{view}': duplicate branch id '{branch}'")]
    DuplicateBranch { view: ViewId, branch: String },

    /// Catalog lookup for a view that was never registered.
    #[error("unknown view '{0}'")]
    UnknownView(ViewId),

    /// Configuration could not be parsed.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The external layout engine failed.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Failures of the external layout boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout of view '{view}' failed: {reason}")]
    Failed { view: ViewId, reason: String },

    #[error("layout of view '{view}' timed out after {after_ms}ms")]
    TimedOut { view: ViewId, after_ms: u64 },
}

impl ComputeError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownElement { .. } => "UNKNOWN_ELEMENT",
            Self::UnknownDeployment { .. } => "UNKNOWN_DEPLOYMENT",
            Self::ExpressionKindMismatch { .. } => "EXPRESSION_KIND_MISMATCH",
            Self::DuplicateBranch { .. } => "DUPLICATE_BRANCH",
            Self::UnknownView(_) => "UNKNOWN_VIEW",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Layout(LayoutError::Failed { .. }) => "LAYOUT_FAILED",
            Self::Layout(LayoutError::TimedOut { .. }) => "LAYOUT_TIMED_OUT",
        }
    }

    /// True for errors caused by the view definition itself.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownElement { .. }
                | Self::UnknownDeployment { .. }
                | Self::ExpressionKindMismatch { .. }
                | Self::DuplicateBranch { .. }
        )
    }

    /// The view this error belongs to, if any.
    pub fn view(&self) -> Option<&ViewId> {
        match self {
            Self::UnknownElement { view, .. }
            | Self::UnknownDeployment { view, .. }
            | Self::ExpressionKindMismatch { view, .. }
            | Self::DuplicateBranch { view, .. } => Some(view),
            Self::UnknownView(view) => Some(view),
            Self::Layout(LayoutError::Failed { view, .. })
            | Self::Layout(LayoutError::TimedOut { view, .. }) => Some(view),
            Self::InvalidConfig(_) => None,
        }
    }
}
