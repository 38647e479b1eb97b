//! Rule expressions.
//!
//! The parser produces these already resolved to FQNs; nothing here knows
//! about source text. `Display` renders the DSL-like form used in logs and
//! error messages (`a.*`, `a.**`, `-> b ->`).

use archview_model::Fqn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which relatives of a referenced element an expression selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// The element itself.
    #[default]
    Exact,
    /// Direct children.
    Children,
    /// Descendants at any depth.
    Descendants,
    /// Every ancestor up to the root.
    Ancestors,
}

/// Element predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementExpr {
    Wildcard,
    Ref {
        fqn: Fqn,
        #[serde(default)]
        selector: Selector,
    },
    Kind {
        kind: String,
        #[serde(default)]
        negate: bool,
    },
    Tag {
        tag: String,
        #[serde(default)]
        negate: bool,
    },
}

impl ElementExpr {
    pub fn exact(fqn: Fqn) -> Self {
        Self::Ref {
            fqn,
            selector: Selector::Exact,
        }
    }

    pub fn children(fqn: Fqn) -> Self {
        Self::Ref {
            fqn,
            selector: Selector::Children,
        }
    }

    pub fn descendants(fqn: Fqn) -> Self {
        Self::Ref {
            fqn,
            selector: Selector::Descendants,
        }
    }

    pub fn ancestors(fqn: Fqn) -> Self {
        Self::Ref {
            fqn,
            selector: Selector::Ancestors,
        }
    }

    pub fn kind(kind: impl Into<String>) -> Self {
        Self::Kind {
            kind: kind.into(),
            negate: false,
        }
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag {
            tag: tag.into(),
            negate: false,
        }
    }
}

/// Relationship predicate. Endpoints are element predicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelationExpr {
    /// `source -> target` (or `source <-> target`).
    Direct {
        source: ElementExpr,
        target: ElementExpr,
        #[serde(default)]
        bidirectional: bool,
    },
    /// `-> target`
    Incoming { target: ElementExpr },
    /// `source ->`
    Outgoing { source: ElementExpr },
    /// `-> element ->`
    InOut { element: ElementExpr },
}

/// Deployment predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeploymentExpr {
    Wildcard,
    Ref {
        fqn: Fqn,
        #[serde(default)]
        selector: Selector,
    },
    /// Deployment connections between two deployment selections.
    Relation {
        source: Box<DeploymentExpr>,
        target: Box<DeploymentExpr>,
    },
}

impl DeploymentExpr {
    pub fn exact(fqn: Fqn) -> Self {
        Self::Ref {
            fqn,
            selector: Selector::Exact,
        }
    }

    pub fn children(fqn: Fqn) -> Self {
        Self::Ref {
            fqn,
            selector: Selector::Children,
        }
    }

    pub fn descendants(fqn: Fqn) -> Self {
        Self::Ref {
            fqn,
            selector: Selector::Descendants,
        }
    }
}

/// Any rule expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Element(ElementExpr),
    Relation(RelationExpr),
    Deployment(DeploymentExpr),
}

impl From<ElementExpr> for Expr {
    fn from(expr: ElementExpr) -> Self {
        Self::Element(expr)
    }
}

impl From<RelationExpr> for Expr {
    fn from(expr: RelationExpr) -> Self {
        Self::Relation(expr)
    }
}

impl From<DeploymentExpr> for Expr {
    fn from(expr: DeploymentExpr) -> Self {
        Self::Deployment(expr)
    }
}

fn write_ref(f: &mut fmt::Formatter<'_>, fqn: &Fqn, selector: Selector) -> fmt::Result {
    match selector {
        Selector::Exact => write!(f, "{fqn}"),
        Selector::Children => write!(f, "{fqn}.*"),
        Selector::Descendants => write!(f, "{fqn}.**"),
        Selector::Ancestors => write!(f, "{fqn}.^"),
    }
}

impl fmt::Display for ElementExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str("*"),
            Self::Ref { fqn, selector } => write_ref(f, fqn, *selector),
            Self::Kind { kind, negate } => {
                write!(f, "element.kind {} {kind}", if *negate { "!=" } else { "=" })
            }
            Self::Tag { tag, negate } => {
                write!(f, "element.tag {} #{tag}", if *negate { "!=" } else { "=" })
            }
        }
    }
}

impl fmt::Display for RelationExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct {
                source,
                target,
                bidirectional,
            } => {
                let arrow = if *bidirectional { "<->" } else { "->" };
                write!(f, "{source} {arrow} {target}")
            }
            Self::Incoming { target } => write!(f, "-> {target}"),
            Self::Outgoing { source } => write!(f, "{source} ->"),
            Self::InOut { element } => write!(f, "-> {element} ->"),
        }
    }
}

impl fmt::Display for DeploymentExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wildcard => f.write_str("*"),
            Self::Ref { fqn, selector } => write_ref(f, fqn, *selector),
            Self::Relation { source, target } => write!(f, "{source} -> {target}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(expr) => expr.fmt(f),
            Self::Relation(expr) => expr.fmt(f),
            Self::Deployment(expr) => expr.fmt(f),
        }
    }
}
