//! Directed relationships between elements.

use crate::element::ViewId;
use crate::fqn::Fqn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Stable relationship identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationId(String);

impl RelationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RelationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RelationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Line style token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

/// Arrow head/tail token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowType {
    None,
    Normal,
    Onormal,
    Diamond,
    Odiamond,
    Crow,
    Open,
    Dot,
    Odot,
    Vee,
}

/// A directed relationship. Source and target never share an ancestor chain;
/// this is enforced when the model graph is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationId,
    pub source: Fqn,
    pub target: Fqn,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
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
}

impl Relationship {
    pub fn new(id: impl Into<RelationId>, source: Fqn, target: Fqn) -> Self {
        Self {
            id: id.into(),
            source,
            target,
            title: None,
            description: None,
            technology: None,
            kind: None,
            tags: BTreeSet::new(),
            color: None,
            line: None,
            head: None,
            tail: None,
            navigate_to: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_technology(mut self, technology: impl Into<String>) -> Self {
        self.technology = Some(technology.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_line(mut self, line: LineStyle) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_head(mut self, head: ArrowType) -> Self {
        self.head = Some(head);
        self
    }

    pub fn with_navigate_to(mut self, view: impl Into<ViewId>) -> Self {
        self.navigate_to = Some(view.into());
        self
    }

    /// True if the relationship leaves `source`'s subtree and enters `target`'s.
    pub fn connects(&self, source: &Fqn, target: &Fqn) -> bool {
        self.source.is_within(source) && self.target.is_within(target)
    }
}
