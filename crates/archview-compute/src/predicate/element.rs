use super::relation::match_relationship;
use super::{push_unique, Predicate, PredicateExecutor, Resolved};
use crate::error::ComputeError;
use crate::expr::{ElementExpr, Expr, RelationExpr, Selector};
use crate::memory::{Connection, ExclusionKey};
use crate::view::ViewKind;
use archview_model::{Fqn, ModelGraph, RelationId, ViewId};

/// Executes element and relation expressions of element views.
#[derive(Debug, Clone, Copy)]
pub struct ModelExecutor<'a> {
    graph: &'a ModelGraph,
    view: &'a ViewId,
    scope: Option<&'a Fqn>,
    kind: ViewKind,
}

impl<'a> ModelExecutor<'a> {
    pub fn new(graph: &'a ModelGraph, view: &'a ViewId, scope: Option<&'a Fqn>) -> Self {
        Self {
            graph,
            view,
            scope,
            kind: ViewKind::Element,
        }
    }

    /// Executor for the extra-element rules of a dynamic view. Only element
    /// expressions are accepted there.
    pub fn for_dynamic(graph: &'a ModelGraph, view: &'a ViewId, scope: Option<&'a Fqn>) -> Self {
        Self {
            kind: ViewKind::Dynamic,
            ..Self::new(graph, view, scope)
        }
    }

    pub fn graph(&self) -> &'a ModelGraph {
        self.graph
    }

    fn mismatch(&self, expr: &Expr) -> ComputeError {
        ComputeError::ExpressionKindMismatch {
            view: self.view.clone(),
            kind: self.kind,
            expr: expr.to_string(),
        }
    }

    fn validate_element(&self, expr: &ElementExpr) -> Result<(), ComputeError> {
        match expr {
            ElementExpr::Ref { fqn, .. } if !self.graph.contains(fqn) => {
                Err(ComputeError::UnknownElement {
                    view: self.view.clone(),
                    fqn: fqn.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    fn validate_relation(&self, expr: &RelationExpr) -> Result<(), ComputeError> {
        match expr {
            RelationExpr::Direct { source, target, .. } => {
                self.validate_element(source)?;
                self.validate_element(target)
            }
            RelationExpr::Incoming { target } => self.validate_element(target),
            RelationExpr::Outgoing { source } => self.validate_element(source),
            RelationExpr::InOut { element } => self.validate_element(element),
        }
    }

    fn in_scope(&self, fqn: &Fqn) -> bool {
        self.scope.map_or(true, |scope| fqn.is_within(scope))
    }

    /// Elements an element expression brings into the view.
    pub fn select(&self, expr: &ElementExpr) -> Resolved {
        let (explicit, implicit) = match expr {
            ElementExpr::Wildcard => {
                let explicit = match self.scope {
                    Some(scope) => std::iter::once(scope.clone())
                        .chain(self.graph.descendants(scope))
                        .collect(),
                    None => self.graph.elements().iter().map(|e| e.id.clone()).collect(),
                };
                (explicit, Vec::new())
            }
            ElementExpr::Ref { fqn, selector } => {
                let implicit = match selector {
                    Selector::Exact => Vec::new(),
                    Selector::Children => self.graph.children(fqn).to_vec(),
                    Selector::Descendants => self.graph.descendants(fqn),
                    Selector::Ancestors => {
                        let mut ancestors = self.graph.ancestors(fqn);
                        ancestors.reverse();
                        ancestors
                    }
                };
                (vec![fqn.clone()], implicit)
            }
            ElementExpr::Kind { .. } | ElementExpr::Tag { .. } => {
                let explicit = self
                    .graph
                    .elements()
                    .iter()
                    .filter(|e| self.element_matches(expr, &e.id))
                    .map(|e| e.id.clone())
                    .collect();
                (explicit, Vec::new())
            }
        };
        Resolved::Elements { explicit, implicit }
    }

    /// Pure membership test; a selector ref never matches its own anchor.
    pub fn element_matches(&self, expr: &ElementExpr, fqn: &Fqn) -> bool {
        match expr {
            ElementExpr::Wildcard => self.in_scope(fqn),
            ElementExpr::Ref { fqn: target, selector } => match selector {
                Selector::Exact => fqn == target,
                Selector::Children => fqn.parent().as_ref() == Some(target),
                Selector::Descendants => fqn.is_descendant_of(target),
                Selector::Ancestors => fqn.is_ancestor_of(target),
            },
            ElementExpr::Kind { kind, negate } => self
                .graph
                .element(fqn)
                .is_some_and(|e| (&e.kind == kind) != *negate),
            ElementExpr::Tag { tag, negate } => self
                .graph
                .element(fqn)
                .is_some_and(|e| e.tags.contains(tag) != *negate),
        }
    }

    fn select_relations(&self, expr: &RelationExpr) -> Resolved {
        let mut endpoints = Vec::new();
        let mut relations = Vec::new();
        for rel in self.graph.relationships() {
            if let Some((source, target)) = match_relationship(self.graph, expr, rel) {
                push_unique(&mut endpoints, source);
                push_unique(&mut endpoints, target);
                relations.push(rel.id.clone());
            }
        }
        Resolved::Relations {
            endpoints,
            relations,
        }
    }
}

impl PredicateExecutor for ModelExecutor<'_> {
    fn view(&self) -> &ViewId {
        self.view
    }

    fn kind(&self) -> ViewKind {
        self.kind
    }

    fn classify(&self, expr: &Expr) -> Result<Predicate, ComputeError> {
        match expr {
            Expr::Element(e) => {
                self.validate_element(e)?;
                Ok(Predicate::Elements)
            }
            Expr::Relation(r) if self.kind == ViewKind::Element => {
                self.validate_relation(r)?;
                Ok(Predicate::Relations)
            }
            Expr::Relation(_) | Expr::Deployment(_) => Err(self.mismatch(expr)),
        }
    }

    fn include(&self, expr: &Expr) -> Resolved {
        match expr {
            Expr::Element(e) => self.select(e),
            Expr::Relation(r) => self.select_relations(r),
            Expr::Deployment(_) => Resolved::Elements {
                explicit: Vec::new(),
                implicit: Vec::new(),
            },
        }
    }

    fn matches(&self, expr: &Expr, fqn: &Fqn) -> bool {
        match expr {
            Expr::Element(e) => self.element_matches(e, fqn),
            Expr::Relation(_) | Expr::Deployment(_) => false,
        }
    }

    fn matches_relation(
        &self,
        expr: &Expr,
        _connection: &Connection,
        relation: &RelationId,
    ) -> bool {
        let Expr::Relation(expr) = expr else {
            return false;
        };
        self.graph
            .relationship(relation)
            .is_some_and(|rel| match_relationship(self.graph, expr, rel).is_some())
    }

    fn exclusion_key(&self, relation: &RelationId, _connection: &Connection) -> ExclusionKey {
        ExclusionKey::global(relation.clone())
    }
}
