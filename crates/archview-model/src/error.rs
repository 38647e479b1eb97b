//! Model construction errors.

use crate::fqn::{Fqn, FqnError};
use crate::relationship::RelationId;
use thiserror::Error;

/// Structural-invariant violations, rejected when the model graph is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid name: {0}")]
    InvalidFqn(#[from] FqnError),

    #[error("duplicate element '{0}'")]
    DuplicateElement(Fqn),

    #[error("element '{element}' has no parent element '{parent}'")]
    MissingParent { element: Fqn, parent: Fqn },

    #[error("duplicate relationship '{0}'")]
    DuplicateRelationship(RelationId),

    #[error("relationship '{relation}' references unknown element '{element}'")]
    UnknownRelationshipEndpoint { relation: RelationId, element: Fqn },

    #[error("relationship '{relation}' connects '{source_fqn}' and '{target_fqn}' within one hierarchy")]
    SameHierarchyRelationship {
        relation: RelationId,
        source_fqn: Fqn,
        target_fqn: Fqn,
    },

    #[error("duplicate deployment element '{0}'")]
    DuplicateDeployment(Fqn),

    #[error("deployment element '{element}' has no parent node '{parent}'")]
    MissingDeploymentParent { element: Fqn, parent: Fqn },

    #[error("deployed instance '{0}' must be declared inside a deployment node")]
    InstanceWithoutNode(Fqn),

    #[error("deployment element '{child}' cannot be nested inside instance '{instance}'")]
    NestedInInstance { child: Fqn, instance: Fqn },

    #[error("deployed instance '{instance}' references unknown element '{element}'")]
    UnknownInstanceElement { instance: Fqn, element: Fqn },
}

impl ModelError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFqn(_) => "INVALID_FQN",
            Self::DuplicateElement(_) => "DUPLICATE_ELEMENT",
            Self::MissingParent { .. } => "MISSING_PARENT",
            Self::DuplicateRelationship(_) => "DUPLICATE_RELATIONSHIP",
            Self::UnknownRelationshipEndpoint { .. } => "UNKNOWN_RELATIONSHIP_ENDPOINT",
            Self::SameHierarchyRelationship { .. } => "SAME_HIERARCHY_RELATIONSHIP",
            Self::DuplicateDeployment(_) => "DUPLICATE_DEPLOYMENT",
            Self::MissingDeploymentParent { .. } => "MISSING_DEPLOYMENT_PARENT",
            Self::InstanceWithoutNode(_) => "INSTANCE_WITHOUT_NODE",
            Self::NestedInInstance { .. } => "NESTED_IN_INSTANCE",
            Self::UnknownInstanceElement { .. } => "UNKNOWN_INSTANCE_ELEMENT",
        }
    }
}
