use super::{push_unique, Predicate, PredicateExecutor, Resolved};
use crate::error::ComputeError;
use crate::expr::{DeploymentExpr, Expr, Selector};
use crate::memory::{Connection, ExclusionKey};
use crate::view::ViewKind;
use archview_model::{DeploymentElement, Fqn, ModelGraph, RelationId, ViewId};

/// Executes deployment expressions of deployment views.
#[derive(Debug, Clone, Copy)]
pub struct DeploymentExecutor<'a> {
    graph: &'a ModelGraph,
    view: &'a ViewId,
}

impl<'a> DeploymentExecutor<'a> {
    pub fn new(graph: &'a ModelGraph, view: &'a ViewId) -> Self {
        Self { graph, view }
    }

    pub fn graph(&self) -> &'a ModelGraph {
        self.graph
    }

    fn validate(&self, expr: &DeploymentExpr) -> Result<(), ComputeError> {
        match expr {
            DeploymentExpr::Wildcard => Ok(()),
            DeploymentExpr::Ref { fqn, .. } => {
                if self.graph.contains_deployment(fqn) {
                    Ok(())
                } else {
                    Err(ComputeError::UnknownDeployment {
                        view: self.view.clone(),
                        fqn: fqn.clone(),
                    })
                }
            }
            DeploymentExpr::Relation { source, target } => {
                self.validate(source)?;
                self.validate(target)
            }
        }
    }

    fn select(&self, expr: &DeploymentExpr) -> Resolved {
        match expr {
            DeploymentExpr::Wildcard => Resolved::Elements {
                explicit: self
                    .graph
                    .deployments()
                    .iter()
                    .map(|d| d.id().clone())
                    .collect(),
                implicit: Vec::new(),
            },
            DeploymentExpr::Ref { fqn, selector } => {
                let implicit = match selector {
                    Selector::Exact => Vec::new(),
                    Selector::Children => self.graph.deployment_children(fqn).to_vec(),
                    Selector::Descendants => self.graph.deployment_descendants(fqn),
                    Selector::Ancestors => {
                        let mut ancestors = self.graph.deployment_ancestors(fqn);
                        ancestors.reverse();
                        ancestors
                    }
                };
                Resolved::Elements {
                    explicit: vec![fqn.clone()],
                    implicit,
                }
            }
            DeploymentExpr::Relation { source, target } => self.select_connections(source, target),
        }
    }

    /// Deployment connections between two selections: every relationship
    /// whose endpoints are implemented by instances on either side.
    fn select_connections(&self, source: &DeploymentExpr, target: &DeploymentExpr) -> Resolved {
        let instances = self.instances();
        let mut endpoints = Vec::new();
        let mut relations = Vec::new();
        for rel in self.graph.relationships() {
            for from in instances.iter().filter(|i| implements(i, &rel.source)) {
                let Some(s) = self.endpoint(source, from.id()) else {
                    continue;
                };
                for to in instances.iter().filter(|i| implements(i, &rel.target)) {
                    let Some(t) = self.endpoint(target, to.id()) else {
                        continue;
                    };
                    if s.same_hierarchy(&t) {
                        continue;
                    }
                    push_unique(&mut endpoints, s.clone());
                    push_unique(&mut endpoints, t);
                    push_unique(&mut relations, rel.id.clone());
                }
            }
        }
        Resolved::Relations {
            endpoints,
            relations,
        }
    }

    /// Every deployed instance, in declaration order.
    pub fn instances(&self) -> Vec<&'a DeploymentElement> {
        self.graph
            .deployments()
            .iter()
            .filter(|d| d.is_instance())
            .collect()
    }

    /// Closest deployment element selected by `expr` containing `member`.
    fn endpoint(&self, expr: &DeploymentExpr, member: &Fqn) -> Option<Fqn> {
        match expr {
            DeploymentExpr::Wildcard => Some(member.clone()),
            DeploymentExpr::Ref { fqn, selector } => match selector {
                Selector::Exact => member.is_within(fqn).then(|| fqn.clone()),
                Selector::Children => std::iter::once(member.clone())
                    .chain(member.ancestors())
                    .find(|a| a.parent().as_ref() == Some(fqn)),
                Selector::Descendants => member.is_descendant_of(fqn).then(|| member.clone()),
                Selector::Ancestors => self
                    .graph
                    .deployment_ancestors(fqn)
                    .into_iter()
                    .find(|a| member.is_within(a)),
            },
            DeploymentExpr::Relation { .. } => None,
        }
    }

    fn deployment_matches(&self, expr: &DeploymentExpr, fqn: &Fqn) -> bool {
        match expr {
            DeploymentExpr::Wildcard => self.graph.contains_deployment(fqn),
            DeploymentExpr::Ref {
                fqn: target,
                selector,
            } => match selector {
                Selector::Exact => fqn == target,
                Selector::Children => fqn.parent().as_ref() == Some(target),
                Selector::Descendants => fqn.is_descendant_of(target),
                Selector::Ancestors => fqn.is_ancestor_of(target),
            },
            DeploymentExpr::Relation { .. } => false,
        }
    }
}

/// True if instance `instance` deploys `element` or one of its ancestors.
pub(crate) fn implements(instance: &DeploymentElement, element: &Fqn) -> bool {
    instance.element().is_some_and(|own| element.is_within(own))
}

impl PredicateExecutor for DeploymentExecutor<'_> {
    fn view(&self) -> &ViewId {
        self.view
    }

    fn kind(&self) -> ViewKind {
        ViewKind::Deployment
    }

    fn classify(&self, expr: &Expr) -> Result<Predicate, ComputeError> {
        match expr {
            Expr::Deployment(d) => {
                self.validate(d)?;
                Ok(match d {
                    DeploymentExpr::Relation { .. } => Predicate::Relations,
                    _ => Predicate::Elements,
                })
            }
            Expr::Element(_) | Expr::Relation(_) => Err(ComputeError::ExpressionKindMismatch {
                view: self.view.clone(),
                kind: ViewKind::Deployment,
                expr: expr.to_string(),
            }),
        }
    }

    fn include(&self, expr: &Expr) -> Resolved {
        match expr {
            Expr::Deployment(d) => self.select(d),
            Expr::Element(_) | Expr::Relation(_) => Resolved::Elements {
                explicit: Vec::new(),
                implicit: Vec::new(),
            },
        }
    }

    fn matches(&self, expr: &Expr, fqn: &Fqn) -> bool {
        match expr {
            Expr::Deployment(d) => self.deployment_matches(d, fqn),
            Expr::Element(_) | Expr::Relation(_) => false,
        }
    }

    fn matches_relation(
        &self,
        expr: &Expr,
        connection: &Connection,
        _relation: &RelationId,
    ) -> bool {
        match expr {
            Expr::Deployment(DeploymentExpr::Relation { source, target }) => {
                self.endpoint(source, &connection.source).is_some()
                    && self.endpoint(target, &connection.target).is_some()
            }
            _ => false,
        }
    }

    fn exclusion_key(&self, relation: &RelationId, connection: &Connection) -> ExclusionKey {
        ExclusionKey::between(
            relation.clone(),
            connection.source.clone(),
            connection.target.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archview_model::{Element, Relationship};
    use pretty_assertions::assert_eq;

    fn fqn(s: &str) -> Fqn {
        Fqn::new(s).unwrap()
    }

    fn graph() -> ModelGraph {
        ModelGraph::builder()
            .element(Element::new(fqn("api"), "container"))
            .element(Element::new(fqn("db"), "database"))
            .relationship(Relationship::new("r1", fqn("api"), fqn("db")))
            .deployment(DeploymentElement::node(fqn("prod"), "environment"))
            .deployment(DeploymentElement::node(fqn("prod.web"), "zone"))
            .deployment(DeploymentElement::instance(fqn("prod.web.api"), fqn("api")))
            .deployment(DeploymentElement::node(fqn("prod.data"), "zone"))
            .deployment(DeploymentElement::instance(fqn("prod.data.db"), fqn("db")))
            .build()
            .unwrap()
    }

    #[test]
    fn element_expressions_are_rejected() {
        let graph = graph();
        let view = ViewId::new("deploy");
        let exec = DeploymentExecutor::new(&graph, &view);
        let err = exec
            .classify(&Expr::Element(crate::expr::ElementExpr::Wildcard))
            .unwrap_err();
        assert_eq!(err.code(), "EXPRESSION_KIND_MISMATCH");

        let err = exec
            .classify(&Expr::Deployment(DeploymentExpr::exact(fqn("staging"))))
            .unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_DEPLOYMENT");
    }

    #[test]
    fn relation_resolves_through_instances() {
        let graph = graph();
        let view = ViewId::new("deploy");
        let exec = DeploymentExecutor::new(&graph, &view);
        let expr = Expr::Deployment(DeploymentExpr::Relation {
            source: Box::new(DeploymentExpr::exact(fqn("prod.web"))),
            target: Box::new(DeploymentExpr::Wildcard),
        });
        assert_eq!(exec.classify(&expr).unwrap(), Predicate::Relations);
        assert_eq!(
            exec.include(&expr),
            Resolved::Relations {
                endpoints: vec![fqn("prod.web"), fqn("prod.data.db")],
                relations: vec![RelationId::new("r1")],
            }
        );
    }

    #[test]
    fn children_selector() {
        let graph = graph();
        let view = ViewId::new("deploy");
        let exec = DeploymentExecutor::new(&graph, &view);
        assert_eq!(
            exec.include(&Expr::Deployment(DeploymentExpr::children(fqn("prod")))),
            Resolved::Elements {
                explicit: vec![fqn("prod")],
                implicit: vec![fqn("prod.web"), fqn("prod.data")],
            }
        );
    }
}
