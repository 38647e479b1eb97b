//! Elements and structural style tokens.

use crate::fqn::Fqn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Identifier of a view (target of `navigate_to` links).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(String);

impl ViewId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Node shape token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    #[default]
    Rectangle,
    Person,
    Browser,
    Mobile,
    Cylinder,
    Storage,
    Queue,
}

/// Border token for container/leaf nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderStyle {
    Solid,
    Dashed,
    Dotted,
    None,
}

/// Structural style of an element. Every field is optional so that style
/// rules can be layered field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<BorderStyle>,
    /// Opacity in percent (0-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<u8>,
}

impl ElementStyle {
    /// Overlay every field `other` sets.
    pub fn apply(&mut self, other: &ElementStyle) {
        if other.color.is_some() {
            self.color.clone_from(&other.color);
        }
        if other.shape.is_some() {
            self.shape = other.shape;
        }
        if other.border.is_some() {
            self.border = other.border;
        }
        if let Some(opacity) = other.opacity {
            self.opacity = Some(opacity.min(100));
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &ElementStyle::default()
    }
}

/// External link attached to an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A hierarchical model element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: Fqn,
    pub kind: String,
    /// Display title; defaults to the last FQN segment.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "ElementStyle::is_empty")]
    pub style: ElementStyle,
    /// Explicit drill-down target; overrides the derived one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigate_to: Option<ViewId>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Element {
    pub fn new(id: Fqn, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            title: None,
            description: None,
            technology: None,
            tags: BTreeSet::new(),
            links: Vec::new(),
            style: ElementStyle::default(),
            navigate_to: None,
            metadata: BTreeMap::new(),
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

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_navigate_to(mut self, view: impl Into<ViewId>) -> Self {
        self.navigate_to = Some(view.into());
        self
    }

    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        self.links.push(Link {
            url: url.into(),
            title: None,
        });
        self
    }

    /// Title to render: explicit title or the last FQN segment.
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| self.id.name().to_string())
    }
}
