//! The immutable model graph.
//!
//! `ModelGraph` is built once per project snapshot through [`ModelGraphBuilder`]
//! and is read-only afterwards. All structural invariants are checked in
//! [`ModelGraphBuilder::build`]; every query below can therefore assume a
//! well-formed forest and well-formed relationships.
//!
//! Every query returns results in declaration order so that downstream
//! computation never depends on hash-map iteration order.

use crate::deployment::DeploymentElement;
use crate::element::Element;
use crate::error::ModelError;
use crate::fqn::Fqn;
use crate::relationship::{RelationId, Relationship};
use std::collections::HashMap;
use tracing::debug;

/// Read-only snapshot of elements, relationships and deployment topology.
#[derive(Debug, Clone, Default)]
pub struct ModelGraph {
    elements: Vec<Element>,
    element_index: HashMap<Fqn, usize>,
    children: HashMap<Fqn, Vec<Fqn>>,
    roots: Vec<Fqn>,

    relationships: Vec<Relationship>,
    relation_index: HashMap<RelationId, usize>,
    /// Relationship indices keyed by exact source FQN.
    by_source: HashMap<Fqn, Vec<usize>>,
    /// Relationship indices keyed by exact target FQN.
    by_target: HashMap<Fqn, Vec<usize>>,

    deployments: Vec<DeploymentElement>,
    deployment_index: HashMap<Fqn, usize>,
    deployment_children: HashMap<Fqn, Vec<Fqn>>,
    deployment_roots: Vec<Fqn>,
}

impl ModelGraph {
    /// Start building a graph.
    pub fn builder() -> ModelGraphBuilder {
        ModelGraphBuilder::new()
    }

    // ── Elements ────────────────────────────────────────────────

    pub fn element(&self, fqn: &Fqn) -> Option<&Element> {
        self.element_index.get(fqn).map(|&idx| &self.elements[idx])
    }

    pub fn contains(&self, fqn: &Fqn) -> bool {
        self.element_index.contains_key(fqn)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn roots(&self) -> &[Fqn] {
        &self.roots
    }

    /// Position of an element in declaration order.
    pub fn declaration_index(&self, fqn: &Fqn) -> Option<usize> {
        self.element_index.get(fqn).copied()
    }

    pub fn children(&self, fqn: &Fqn) -> &[Fqn] {
        self.children.get(fqn).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_children(&self, fqn: &Fqn) -> bool {
        !self.children(fqn).is_empty()
    }

    /// All descendants in pre-order.
    pub fn descendants(&self, fqn: &Fqn) -> Vec<Fqn> {
        let mut out = Vec::new();
        collect_preorder(&self.children, fqn, &mut out);
        out
    }

    /// Ancestors that exist in the model, closest first.
    pub fn ancestors(&self, fqn: &Fqn) -> Vec<Fqn> {
        fqn.ancestors().filter(|a| self.contains(a)).collect()
    }

    // ── Relationships ───────────────────────────────────────────

    pub fn relationship(&self, id: &RelationId) -> Option<&Relationship> {
        self.relation_index
            .get(id)
            .map(|&idx| &self.relationships[idx])
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn relation_declaration_index(&self, id: &RelationId) -> Option<usize> {
        self.relation_index.get(id).copied()
    }

    /// Relationships leading from `source`'s subtree into `target`'s subtree.
    pub fn relationships_between(&self, source: &Fqn, target: &Fqn) -> Vec<&Relationship> {
        let mut indices: Vec<usize> = std::iter::once(source.clone())
            .chain(self.descendants(source))
            .filter_map(|fqn| self.by_source.get(&fqn))
            .flatten()
            .copied()
            .filter(|&idx| self.relationships[idx].connects(source, target))
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
            .into_iter()
            .map(|idx| &self.relationships[idx])
            .collect()
    }

    /// Relationships entering the subtree of `fqn` from outside.
    pub fn incoming(&self, fqn: &Fqn) -> Vec<&Relationship> {
        self.crossing(fqn, &self.by_target, |rel| &rel.source)
    }

    /// Relationships leaving the subtree of `fqn`.
    pub fn outgoing(&self, fqn: &Fqn) -> Vec<&Relationship> {
        self.crossing(fqn, &self.by_source, |rel| &rel.target)
    }

    fn crossing<'a>(
        &'a self,
        fqn: &Fqn,
        index: &HashMap<Fqn, Vec<usize>>,
        far_end: impl Fn(&Relationship) -> &Fqn,
    ) -> Vec<&'a Relationship> {
        let mut indices: Vec<usize> = std::iter::once(fqn.clone())
            .chain(self.descendants(fqn))
            .filter_map(|member| index.get(&member))
            .flatten()
            .copied()
            .filter(|&idx| !far_end(&self.relationships[idx]).is_within(fqn))
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
            .into_iter()
            .map(|idx| &self.relationships[idx])
            .collect()
    }

    // ── Deployment topology ─────────────────────────────────────

    pub fn deployment(&self, fqn: &Fqn) -> Option<&DeploymentElement> {
        self.deployment_index
            .get(fqn)
            .map(|&idx| &self.deployments[idx])
    }

    pub fn contains_deployment(&self, fqn: &Fqn) -> bool {
        self.deployment_index.contains_key(fqn)
    }

    pub fn deployments(&self) -> &[DeploymentElement] {
        &self.deployments
    }

    pub fn deployment_roots(&self) -> &[Fqn] {
        &self.deployment_roots
    }

    pub fn deployment_declaration_index(&self, fqn: &Fqn) -> Option<usize> {
        self.deployment_index.get(fqn).copied()
    }

    pub fn deployment_children(&self, fqn: &Fqn) -> &[Fqn] {
        self.deployment_children
            .get(fqn)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn deployment_descendants(&self, fqn: &Fqn) -> Vec<Fqn> {
        let mut out = Vec::new();
        collect_preorder(&self.deployment_children, fqn, &mut out);
        out
    }

    pub fn deployment_ancestors(&self, fqn: &Fqn) -> Vec<Fqn> {
        fqn.ancestors()
            .filter(|a| self.contains_deployment(a))
            .collect()
    }

    /// Instances at or below `fqn`, in pre-order.
    pub fn instances_within(&self, fqn: &Fqn) -> Vec<&DeploymentElement> {
        std::iter::once(fqn.clone())
            .chain(self.deployment_descendants(fqn))
            .filter_map(|member| self.deployment(&member))
            .filter(|d| d.is_instance())
            .collect()
    }
}

fn collect_preorder(children: &HashMap<Fqn, Vec<Fqn>>, fqn: &Fqn, out: &mut Vec<Fqn>) {
    if let Some(kids) = children.get(fqn) {
        for kid in kids {
            out.push(kid.clone());
            collect_preorder(children, kid, out);
        }
    }
}

/// Collects model parts and validates them into a [`ModelGraph`].
#[derive(Debug, Default)]
pub struct ModelGraphBuilder {
    elements: Vec<Element>,
    relationships: Vec<Relationship>,
    deployments: Vec<DeploymentElement>,
}

impl ModelGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&mut self, element: Element) -> &mut Self {
        self.elements.push(element);
        self
    }

    pub fn add_relationship(&mut self, relationship: Relationship) -> &mut Self {
        self.relationships.push(relationship);
        self
    }

    pub fn add_deployment(&mut self, deployment: DeploymentElement) -> &mut Self {
        self.deployments.push(deployment);
        self
    }

    /// Chaining form of [`add_element`](Self::add_element).
    pub fn element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    /// Chaining form of [`add_relationship`](Self::add_relationship).
    pub fn relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Chaining form of [`add_deployment`](Self::add_deployment).
    pub fn deployment(mut self, deployment: DeploymentElement) -> Self {
        self.deployments.push(deployment);
        self
    }

    /// Validate every structural invariant and freeze the graph.
    pub fn build(self) -> Result<ModelGraph, ModelError> {
        let mut graph = ModelGraph::default();

        // Elements
        for (idx, element) in self.elements.iter().enumerate() {
            if graph
                .element_index
                .insert(element.id.clone(), idx)
                .is_some()
            {
                return Err(ModelError::DuplicateElement(element.id.clone()));
            }
        }
        for element in &self.elements {
            match element.id.parent() {
                Some(parent) if !graph.element_index.contains_key(&parent) => {
                    return Err(ModelError::MissingParent {
                        element: element.id.clone(),
                        parent,
                    });
                }
                Some(parent) => graph
                    .children
                    .entry(parent)
                    .or_default()
                    .push(element.id.clone()),
                None => graph.roots.push(element.id.clone()),
            }
        }
        graph.elements = self.elements;

        // Relationships
        for (idx, rel) in self.relationships.iter().enumerate() {
            for endpoint in [&rel.source, &rel.target] {
                if !graph.element_index.contains_key(endpoint) {
                    return Err(ModelError::UnknownRelationshipEndpoint {
                        relation: rel.id.clone(),
                        element: endpoint.clone(),
                    });
                }
            }
            if rel.source.same_hierarchy(&rel.target) {
                return Err(ModelError::SameHierarchyRelationship {
                    relation: rel.id.clone(),
                    source_fqn: rel.source.clone(),
                    target_fqn: rel.target.clone(),
                });
            }
            if graph.relation_index.insert(rel.id.clone(), idx).is_some() {
                return Err(ModelError::DuplicateRelationship(rel.id.clone()));
            }
            graph
                .by_source
                .entry(rel.source.clone())
                .or_default()
                .push(idx);
            graph
                .by_target
                .entry(rel.target.clone())
                .or_default()
                .push(idx);
        }
        graph.relationships = self.relationships;

        // Deployment topology
        for (idx, deployment) in self.deployments.iter().enumerate() {
            if graph
                .deployment_index
                .insert(deployment.id().clone(), idx)
                .is_some()
            {
                return Err(ModelError::DuplicateDeployment(deployment.id().clone()));
            }
        }
        for deployment in &self.deployments {
            let id = deployment.id();
            if let Some(element) = deployment.element() {
                if !graph.element_index.contains_key(element) {
                    return Err(ModelError::UnknownInstanceElement {
                        instance: id.clone(),
                        element: element.clone(),
                    });
                }
            }
            match id.parent() {
                None if deployment.is_instance() => {
                    return Err(ModelError::InstanceWithoutNode(id.clone()));
                }
                None => graph.deployment_roots.push(id.clone()),
                Some(parent) => {
                    let Some(&parent_idx) = graph.deployment_index.get(&parent) else {
                        return Err(ModelError::MissingDeploymentParent {
                            element: id.clone(),
                            parent,
                        });
                    };
                    if self.deployments[parent_idx].is_instance() {
                        return Err(ModelError::NestedInInstance {
                            child: id.clone(),
                            instance: parent,
                        });
                    }
                    graph
                        .deployment_children
                        .entry(parent)
                        .or_default()
                        .push(id.clone());
                }
            }
        }
        graph.deployments = self.deployments;

        debug!(
            elements = graph.elements.len(),
            relationships = graph.relationships.len(),
            deployments = graph.deployments.len(),
            "Model graph built"
        );

        Ok(graph)
    }
}
