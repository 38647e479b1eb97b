//! Implied connections.
//!
//! Every relationship is assigned to the deepest pair of in-view elements
//! containing its endpoints, so an ancestor pair never repeats an edge a more
//! specific pair already draws. The stage recomputes connections from scratch;
//! exclusions recorded in memory are honoured.

use crate::memory::{Connection, Memory};
use crate::predicate::{implements, DeploymentExecutor, ModelExecutor};
use archview_model::{Fqn, RelationId};

/// Graph-specific half of the pipeline: how connections are derived and
/// which elements count as structural parents.
pub trait Topology {
    fn connect(&self, memory: &Memory) -> Vec<Connection>;

    /// True if `fqn` has children in the underlying forest.
    fn is_structural_parent(&self, fqn: &Fqn) -> bool;
}

/// Deepest element of `memory` that is `fqn` or one of its ancestors.
fn closest_in_view(memory: &Memory, fqn: &Fqn) -> Option<Fqn> {
    std::iter::once(fqn.clone())
        .chain(fqn.ancestors())
        .find(|candidate| memory.elements.contains(candidate))
}

/// Accumulates connections in first-seen order.
#[derive(Default)]
struct Connections(Vec<Connection>);

impl Connections {
    fn add(&mut self, source: Fqn, target: Fqn, relation: &RelationId) {
        match self
            .0
            .iter_mut()
            .find(|c| c.source == source && c.target == target)
        {
            Some(existing) => {
                if !existing.relations.contains(relation) {
                    existing.relations.push(relation.clone());
                }
            }
            None => self.0.push(Connection {
                source,
                target,
                relations: vec![relation.clone()],
            }),
        }
    }
}

impl Topology for ModelExecutor<'_> {
    fn connect(&self, memory: &Memory) -> Vec<Connection> {
        let mut out = Connections::default();
        for rel in self.graph().relationships() {
            let (Some(source), Some(target)) = (
                closest_in_view(memory, &rel.source),
                closest_in_view(memory, &rel.target),
            ) else {
                continue;
            };
            if source.same_hierarchy(&target) || memory.is_excluded(&rel.id, &source, &target) {
                continue;
            }
            out.add(source, target, &rel.id);
        }
        out.0
    }

    fn is_structural_parent(&self, fqn: &Fqn) -> bool {
        self.graph().has_children(fqn)
    }
}

impl Topology for DeploymentExecutor<'_> {
    fn connect(&self, memory: &Memory) -> Vec<Connection> {
        let instances = self.instances();
        let mut out = Connections::default();
        for rel in self.graph().relationships() {
            for from in instances.iter().filter(|i| implements(i, &rel.source)) {
                let Some(source) = closest_in_view(memory, from.id()) else {
                    continue;
                };
                for to in instances.iter().filter(|i| implements(i, &rel.target)) {
                    let Some(target) = closest_in_view(memory, to.id()) else {
                        continue;
                    };
                    if source.same_hierarchy(&target)
                        || memory.is_excluded(&rel.id, &source, &target)
                    {
                        continue;
                    }
                    out.add(source.clone(), target, &rel.id);
                }
            }
        }
        out.0
    }

    fn is_structural_parent(&self, fqn: &Fqn) -> bool {
        !self.graph().deployment_children(fqn).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archview_model::{DeploymentElement, Element, ModelGraph, Relationship, ViewId};
    use pretty_assertions::assert_eq;

    fn fqn(s: &str) -> Fqn {
        Fqn::new(s).unwrap()
    }

    fn memory_of(items: &[&str]) -> Memory {
        let mut memory = Memory::new();
        memory.elements.extend(items.iter().map(|s| fqn(s)));
        memory
    }

    #[test]
    fn relationships_lift_to_deepest_pair() {
        let graph = ModelGraph::builder()
            .element(Element::new(fqn("a"), "system"))
            .element(Element::new(fqn("a.b"), "container"))
            .element(Element::new(fqn("c"), "system"))
            .element(Element::new(fqn("c.d"), "container"))
            .relationship(Relationship::new("r1", fqn("a.b"), fqn("c.d")))
            .relationship(Relationship::new("r2", fqn("a"), fqn("c.d")))
            .build()
            .unwrap();
        let view = ViewId::new("v");
        let exec = ModelExecutor::new(&graph, &view, None);

        let connections = exec.connect(&memory_of(&["a", "c"]));
        assert_eq!(
            connections,
            vec![Connection {
                source: fqn("a"),
                target: fqn("c"),
                relations: vec![RelationId::new("r1"), RelationId::new("r2")],
            }]
        );

        let connections = exec.connect(&memory_of(&["a", "a.b", "c"]));
        assert_eq!(connections.len(), 2);
        assert_eq!(connections[0].source, fqn("a.b"));
        assert_eq!(connections[1].source, fqn("a"));
    }

    #[test]
    fn deployment_connections_follow_instances() {
        let graph = ModelGraph::builder()
            .element(Element::new(fqn("api"), "container"))
            .element(Element::new(fqn("db"), "database"))
            .relationship(Relationship::new("r1", fqn("api"), fqn("db")))
            .deployment(DeploymentElement::node(fqn("prod"), "environment"))
            .deployment(DeploymentElement::node(fqn("prod.vm1"), "vm"))
            .deployment(DeploymentElement::instance(fqn("prod.vm1.api"), fqn("api")))
            .deployment(DeploymentElement::node(fqn("prod.vm2"), "vm"))
            .deployment(DeploymentElement::instance(fqn("prod.vm2.db"), fqn("db")))
            .build()
            .unwrap();
        let view = ViewId::new("deploy");
        let exec = DeploymentExecutor::new(&graph, &view);

        let connections = exec.connect(&memory_of(&["prod", "prod.vm1", "prod.vm2"]));
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].source, fqn("prod.vm1"));
        assert_eq!(connections[0].target, fqn("prod.vm2"));

        // Both ends collapse into one node: no self connection.
        assert!(exec.connect(&memory_of(&["prod"])).is_empty());
        assert!(exec.is_structural_parent(&fqn("prod.vm1")));
        assert!(!exec.is_structural_parent(&fqn("prod.vm1.api")));
    }
}
