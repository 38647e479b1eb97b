//! Deterministic render order.
//!
//! Nodes are ordered topologically over a graph holding containment
//! (`parent -> child`) and edge direction (`source -> target`). Ties go to
//! the lower input position, so the caller decides the tie-break by handing
//! nodes over in declaration order. Cycles are broken by releasing the
//! lowest-positioned remaining node whose parent is already placed.

use crate::computed::{ComputedEdge, ComputedNode};
use archview_model::Fqn;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use tracing::trace;

/// Order `nodes` and `edges` for rendering.
pub fn sort_view(
    nodes: Vec<ComputedNode>,
    edges: Vec<ComputedEdge>,
) -> (Vec<ComputedNode>, Vec<ComputedEdge>) {
    let order = node_order(&nodes, &edges);
    let mut slots: Vec<Option<ComputedNode>> = nodes.into_iter().map(Some).collect();
    let nodes: Vec<ComputedNode> = order.iter().filter_map(|&idx| slots[idx].take()).collect();
    let edges = sort_edges(&nodes, edges);
    (nodes, edges)
}

/// Edges by (source position, target position, input position).
pub fn sort_edges(nodes: &[ComputedNode], edges: Vec<ComputedEdge>) -> Vec<ComputedEdge> {
    let position: HashMap<&Fqn, usize> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (&node.id, idx))
        .collect();
    let mut keyed: Vec<(usize, usize, usize, ComputedEdge)> = edges
        .into_iter()
        .enumerate()
        .map(|(idx, edge)| {
            let s = position.get(&edge.source).copied().unwrap_or(usize::MAX);
            let t = position.get(&edge.target).copied().unwrap_or(usize::MAX);
            (s, t, idx, edge)
        })
        .collect();
    keyed.sort_by_key(|(s, t, idx, _)| (*s, *t, *idx));
    keyed.into_iter().map(|(_, _, _, edge)| edge).collect()
}

fn node_order(nodes: &[ComputedNode], edges: &[ComputedEdge]) -> Vec<usize> {
    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(nodes.len(), edges.len());
    let mut index: HashMap<&Fqn, NodeIndex> = HashMap::with_capacity(nodes.len());
    for (pos, node) in nodes.iter().enumerate() {
        index.insert(&node.id, graph.add_node(pos));
    }

    let mut parent: Vec<Option<NodeIndex>> = vec![None; nodes.len()];
    for (pos, node) in nodes.iter().enumerate() {
        if let Some(p) = node.id.ancestors().find_map(|a| index.get(&a).copied()) {
            parent[pos] = Some(p);
            graph.add_edge(p, NodeIndex::new(pos), ());
        }
    }
    for edge in edges {
        if let (Some(&s), Some(&t)) = (index.get(&edge.source), index.get(&edge.target)) {
            if s != t {
                graph.update_edge(s, t, ());
            }
        }
    }

    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();
    let mut placed = vec![false; nodes.len()];
    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &d)| d == 0)
        .map(|(pos, _)| Reverse(pos))
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while order.len() < nodes.len() {
        let Some(Reverse(pos)) = ready.pop() else {
            // Cycle: release the first remaining node whose parent is placed.
            let released = (0..nodes.len())
                .find(|&pos| !placed[pos] && parent[pos].map_or(true, |p| placed[p.index()]))
                .or_else(|| (0..nodes.len()).find(|&pos| !placed[pos]));
            let Some(released) = released else {
                break;
            };
            trace!(node = %nodes[released].id, "breaking ordering cycle");
            in_degree[released] = 0;
            ready.push(Reverse(released));
            continue;
        };
        if placed[pos] {
            continue;
        }
        placed[pos] = true;
        order.push(pos);
        for next in graph.neighbors_directed(NodeIndex::new(pos), Direction::Outgoing) {
            let n = next.index();
            if placed[n] || in_degree[n] == 0 {
                continue;
            }
            in_degree[n] -= 1;
            if in_degree[n] == 0 {
                ready.push(Reverse(n));
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{connection_edges, NodeBuilder};
    use crate::catalog::ScopeIndex;
    use crate::config::ComputeConfig;
    use crate::memory::Connection;
    use archview_model::{Element, ModelGraph, ViewId};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn fqn(s: &str) -> Fqn {
        Fqn::new(s).unwrap()
    }

    fn nodes(ids: &[&str]) -> Vec<ComputedNode> {
        let graph = ModelGraph::default();
        let view = ViewId::new("v");
        let scopes = ScopeIndex::default();
        let config = ComputeConfig::default();
        let builder = NodeBuilder::new(&graph, &view, &scopes, &config);
        ids.iter()
            .map(|id| builder.element_node(&Element::new(fqn(id), "component"), None))
            .collect()
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<ComputedEdge> {
        let connections: Vec<Connection> = pairs
            .iter()
            .map(|(s, t)| Connection {
                source: fqn(s),
                target: fqn(t),
                relations: vec![],
            })
            .collect();
        connection_edges(&ModelGraph::default(), &connections, &HashSet::new())
    }

    fn ids(nodes: &[ComputedNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn edges_and_containment_order_nodes() {
        let (sorted, sorted_edges) = sort_view(
            nodes(&["c", "a", "a.x", "b"]),
            edges(&[("b", "c"), ("a.x", "b")]),
        );
        assert_eq!(ids(&sorted), vec!["a", "a.x", "b", "c"]);
        let edge_ids: Vec<_> = sorted_edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edge_ids, vec!["a.x:b", "b:c"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let (sorted, _) = sort_view(nodes(&["z", "y", "x"]), vec![]);
        assert_eq!(ids(&sorted), vec!["z", "y", "x"]);
    }

    #[test]
    fn cycles_are_broken_deterministically() {
        let (sorted, _) = sort_view(
            nodes(&["a", "a.x", "b", "b.y"]),
            edges(&[("a.x", "b"), ("b.y", "a")]),
        );
        assert_eq!(ids(&sorted), vec!["a", "a.x", "b", "b.y"]);
    }
}
