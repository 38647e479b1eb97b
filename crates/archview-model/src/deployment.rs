//! Deployment topology: nodes and deployed instances.

use crate::element::ElementStyle;
use crate::fqn::Fqn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An element of the deployment forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeploymentElement {
    /// Infrastructure node (environment, zone, vm, cluster...).
    Node {
        id: Fqn,
        kind: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
        tags: BTreeSet<String>,
        #[serde(default, skip_serializing_if = "ElementStyle::is_empty")]
        style: ElementStyle,
    },
    /// A model element deployed inside a node.
    Instance {
        id: Fqn,
        element: Fqn,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
        tags: BTreeSet<String>,
        #[serde(default, skip_serializing_if = "ElementStyle::is_empty")]
        style: ElementStyle,
    },
}

impl DeploymentElement {
    pub fn node(id: Fqn, kind: impl Into<String>) -> Self {
        Self::Node {
            id,
            kind: kind.into(),
            title: None,
            tags: BTreeSet::new(),
            style: ElementStyle::default(),
        }
    }

    pub fn instance(id: Fqn, element: Fqn) -> Self {
        Self::Instance {
            id,
            element,
            title: None,
            tags: BTreeSet::new(),
            style: ElementStyle::default(),
        }
    }

    pub fn with_title(mut self, value: impl Into<String>) -> Self {
        match &mut self {
            Self::Node { title, .. } | Self::Instance { title, .. } => {
                *title = Some(value.into());
            }
        }
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        match &mut self {
            Self::Node { tags, .. } | Self::Instance { tags, .. } => {
                tags.insert(tag.into());
            }
        }
        self
    }

    pub fn id(&self) -> &Fqn {
        match self {
            Self::Node { id, .. } | Self::Instance { id, .. } => id,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Node { title, .. } | Self::Instance { title, .. } => title.as_deref(),
        }
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        match self {
            Self::Node { tags, .. } | Self::Instance { tags, .. } => tags,
        }
    }

    pub fn style(&self) -> &ElementStyle {
        match self {
            Self::Node { style, .. } | Self::Instance { style, .. } => style,
        }
    }

    /// Referenced model element, for instances.
    pub fn element(&self) -> Option<&Fqn> {
        match self {
            Self::Node { .. } => None,
            Self::Instance { element, .. } => Some(element),
        }
    }

    pub fn is_instance(&self) -> bool {
        matches!(self, Self::Instance { .. })
    }
}
