//! Edge/node builder.
//!
//! Turns a final [`Memory`] snapshot into computed nodes and edges. Hierarchy
//! and edge links (`parent`, `children`, `level`, `depth`, `in_edges`,
//! `out_edges`) are filled in by post-passes once the final order is known.

use crate::catalog::ScopeIndex;
use crate::computed::{ComputedEdge, ComputedNode};
use crate::config::ComputeConfig;
use crate::memory::{Connection, Memory};
use crate::merge::merge_relations;
use archview_model::{DeploymentElement, Element, ElementStyle, Fqn, ModelGraph, ViewId};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Builds nodes for one view.
pub struct NodeBuilder<'a> {
    graph: &'a ModelGraph,
    view: &'a ViewId,
    scopes: &'a ScopeIndex,
    config: &'a ComputeConfig,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(
        graph: &'a ModelGraph,
        view: &'a ViewId,
        scopes: &'a ScopeIndex,
        config: &'a ComputeConfig,
    ) -> Self {
        Self {
            graph,
            view,
            scopes,
            config,
        }
    }

    fn navigate_to(&self, element: &Element) -> Option<ViewId> {
        element.navigate_to.clone().or_else(|| {
            if self.config.derive_navigate_to {
                self.scopes.first_scoped(&element.id, self.view).cloned()
            } else {
                None
            }
        })
    }

    /// Node for a model element, with rule styles layered over its own.
    pub fn element_node(&self, element: &Element, overrides: Option<&ElementStyle>) -> ComputedNode {
        let mut style = element.style.clone();
        if let Some(overrides) = overrides {
            style.apply(overrides);
        }
        ComputedNode {
            id: element.id.clone(),
            kind: element.kind.clone(),
            title: element.display_title(),
            description: element.description.clone(),
            technology: element.technology.clone(),
            tags: element.tags.clone(),
            links: element.links.clone(),
            style,
            navigate_to: self.navigate_to(element),
            model_ref: None,
            parent: None,
            children: Vec::new(),
            level: 0,
            depth: 0,
            in_edges: Vec::new(),
            out_edges: Vec::new(),
        }
    }

    /// Nodes for every element in memory, in memory order.
    pub fn element_nodes(&self, memory: &Memory) -> Vec<ComputedNode> {
        memory
            .elements
            .iter()
            .filter_map(|fqn| {
                let element = self.graph.element(fqn);
                if element.is_none() {
                    warn!(view = %self.view, element = %fqn, "element vanished from model");
                }
                element
            })
            .map(|element| self.element_node(element, memory.styles.get(&element.id)))
            .collect()
    }

    fn deployment_node(
        &self,
        deployment: &DeploymentElement,
        overrides: Option<&ElementStyle>,
    ) -> Option<ComputedNode> {
        let mut node = match deployment {
            DeploymentElement::Node {
                id,
                kind,
                title,
                tags,
                style,
            } => ComputedNode {
                id: id.clone(),
                kind: kind.clone(),
                title: title.clone().unwrap_or_else(|| id.name().to_string()),
                description: None,
                technology: None,
                tags: tags.clone(),
                links: Vec::new(),
                style: style.clone(),
                navigate_to: None,
                model_ref: None,
                parent: None,
                children: Vec::new(),
                level: 0,
                depth: 0,
                in_edges: Vec::new(),
                out_edges: Vec::new(),
            },
            DeploymentElement::Instance {
                id,
                element,
                title,
                tags,
                style,
            } => {
                let model = self.graph.element(element)?;
                let mut node = self.element_node(model, None);
                node.id = id.clone();
                node.model_ref = Some(element.clone());
                if let Some(title) = title {
                    node.title.clone_from(title);
                }
                node.tags.extend(tags.iter().cloned());
                node.style.apply(style);
                node
            }
        };
        if let Some(overrides) = overrides {
            node.style.apply(overrides);
        }
        Some(node)
    }

    /// Nodes for every deployment element in memory, in memory order.
    pub fn deployment_nodes(&self, memory: &Memory) -> Vec<ComputedNode> {
        memory
            .elements
            .iter()
            .filter_map(|fqn| self.graph.deployment(fqn))
            .filter_map(|d| self.deployment_node(d, memory.styles.get(d.id())))
            .collect()
    }
}

/// Edge id for element and deployment views.
pub fn edge_id(source: &Fqn, target: &Fqn) -> String {
    format!("{source}:{target}")
}

/// Closest common ancestor of `a` and `b` present in `ids`.
pub fn common_parent(ids: &HashSet<Fqn>, a: &Fqn, b: &Fqn) -> Option<Fqn> {
    std::iter::successors(a.common_ancestor(b), Fqn::parent).find(|fqn| ids.contains(fqn))
}

/// One edge per connection, with merged relationship properties.
pub fn connection_edges(
    graph: &ModelGraph,
    connections: &[Connection],
    ids: &HashSet<Fqn>,
) -> Vec<ComputedEdge> {
    connections
        .iter()
        .map(|connection| {
            let relations: Vec<_> = connection
                .relations
                .iter()
                .filter_map(|id| graph.relationship(id))
                .collect();
            let merged = merge_relations(&relations, &connection.source, &connection.target);
            ComputedEdge {
                id: edge_id(&connection.source, &connection.target),
                source: connection.source.clone(),
                target: connection.target.clone(),
                parent: common_parent(ids, &connection.source, &connection.target),
                relations: connection.relations.clone(),
                label: merged.label,
                description: merged.description,
                technology: merged.technology,
                kind: merged.kind,
                tags: merged.tags,
                color: merged.color,
                line: merged.line,
                head: merged.head,
                tail: merged.tail,
                navigate_to: merged.navigate_to,
                notes: None,
                is_backward: false,
            }
        })
        .collect()
}

/// Fill `parent`, `children`, `level` and `depth`. Children follow node order.
pub fn link_hierarchy(nodes: &mut [ComputedNode]) {
    let index: HashMap<Fqn, usize> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.clone(), idx))
        .collect();

    let parents: Vec<Option<usize>> = nodes
        .iter()
        .map(|node| node.id.ancestors().find_map(|a| index.get(&a).copied()))
        .collect();

    for node in nodes.iter_mut() {
        node.children.clear();
        node.level = node.id.ancestors().filter(|a| index.contains_key(a)).count();
        node.depth = 0;
    }
    for (idx, parent) in parents.iter().enumerate() {
        let Some(p) = *parent else {
            nodes[idx].parent = None;
            continue;
        };
        let (id, parent_id) = (nodes[idx].id.clone(), nodes[p].id.clone());
        nodes[idx].parent = Some(parent_id);
        nodes[p].children.push(id);
    }

    // Heights, deepest nodes first.
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by_key(|&idx| std::cmp::Reverse(nodes[idx].level));
    for idx in order {
        if let Some(p) = parents[idx] {
            let height = nodes[idx].depth + 1;
            if nodes[p].depth < height {
                nodes[p].depth = height;
            }
        }
    }
}

/// Fill `in_edges` and `out_edges` in edge order.
pub fn link_edges(nodes: &mut [ComputedNode], edges: &[ComputedEdge]) {
    let index: HashMap<Fqn, usize> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.clone(), idx))
        .collect();
    for node in nodes.iter_mut() {
        node.in_edges.clear();
        node.out_edges.clear();
    }
    for edge in edges {
        if let Some(&s) = index.get(&edge.source) {
            nodes[s].out_edges.push(edge.id.clone());
        }
        if let Some(&t) = index.get(&edge.target) {
            nodes[t].in_edges.push(edge.id.clone());
        }
    }
}
