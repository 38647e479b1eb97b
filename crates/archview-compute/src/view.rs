//! Parsed view definitions: the declarative input of view computation.

use crate::dynamic::RawStep;
use crate::expr::Expr;
use archview_model::{ElementStyle, Fqn, ViewId};
use serde::{Deserialize, Serialize};

/// What a view draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Elements and their (implied) relationships.
    Element,
    /// Deployment nodes, instances and derived deployment connections.
    Deployment,
    /// Ordered interaction steps between actors.
    Dynamic,
}

/// Rank direction requested from the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LayoutDirection {
    #[default]
    #[serde(rename = "TB")]
    TopBottom,
    #[serde(rename = "BT")]
    BottomTop,
    #[serde(rename = "LR")]
    LeftRight,
    #[serde(rename = "RL")]
    RightLeft,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AutoLayout {
    #[serde(default)]
    pub direction: LayoutDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank_sep: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_sep: Option<u32>,
}

impl AutoLayout {
    pub fn new(direction: LayoutDirection) -> Self {
        Self {
            direction,
            rank_sep: None,
            node_sep: None,
        }
    }
}

/// Style tokens applied to every node matched by `targets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRule {
    pub targets: Vec<Expr>,
    pub style: ElementStyle,
}

/// One rule of a view body, evaluated in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ViewRule {
    Include { exprs: Vec<Expr> },
    Exclude { exprs: Vec<Expr> },
    Style(StyleRule),
    AutoLayout(AutoLayout),
}

/// A view as produced by the parser, fully linked to model FQNs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedView {
    pub id: ViewId,
    pub kind: ViewKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Scope element: `view of <fqn>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_of: Option<Fqn>,
    #[serde(default)]
    pub rules: Vec<ViewRule>,
    /// Raw steps; dynamic views only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<RawStep>,
}

impl ParsedView {
    pub fn new(id: impl Into<ViewId>, kind: ViewKind) -> Self {
        Self {
            id: id.into(),
            kind,
            title: None,
            description: None,
            view_of: None,
            rules: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn element(id: impl Into<ViewId>) -> Self {
        Self::new(id, ViewKind::Element)
    }

    pub fn deployment(id: impl Into<ViewId>) -> Self {
        Self::new(id, ViewKind::Deployment)
    }

    pub fn dynamic(id: impl Into<ViewId>) -> Self {
        Self::new(id, ViewKind::Dynamic)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_view_of(mut self, scope: Fqn) -> Self {
        self.view_of = Some(scope);
        self
    }

    pub fn include<I, E>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.rules.push(ViewRule::Include {
            exprs: exprs.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn exclude<I, E>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.rules.push(ViewRule::Exclude {
            exprs: exprs.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn style<I, E>(mut self, targets: I, style: ElementStyle) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.rules.push(ViewRule::Style(StyleRule {
            targets: targets.into_iter().map(Into::into).collect(),
            style,
        }));
        self
    }

    pub fn auto_layout(mut self, layout: AutoLayout) -> Self {
        self.rules.push(ViewRule::AutoLayout(layout));
        self
    }

    pub fn step(mut self, step: impl Into<RawStep>) -> Self {
        self.steps.push(step.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ElementExpr;

    #[test]
    fn rules_deserialize_from_json() {
        let json = r#"{
            "id": "index",
            "kind": "element",
            "title": "Landscape",
            "rules": [
                {"rule": "include", "exprs": [{"element": {"type": "wildcard"}}]},
                {"rule": "exclude", "exprs": [{"element": {"type": "tag", "tag": "deprecated"}}]},
                {"rule": "auto_layout", "direction": "LR"}
            ]
        }"#;
        let view: ParsedView = serde_json::from_str(json).unwrap();
        assert_eq!(view.kind, ViewKind::Element);
        assert_eq!(view.rules.len(), 3);
        assert_eq!(
            view.rules[0],
            ViewRule::Include {
                exprs: vec![Expr::Element(ElementExpr::Wildcard)]
            }
        );
        assert_eq!(
            view.rules[2],
            ViewRule::AutoLayout(AutoLayout::new(LayoutDirection::LeftRight))
        );
    }
}
