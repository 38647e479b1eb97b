//! View computation entry point.

use crate::builder::{connection_edges, link_edges, link_hierarchy, NodeBuilder};
use crate::catalog::ScopeIndex;
use crate::computed::{ComputedNode, ComputedView};
use crate::config::ComputeConfig;
use crate::dynamic;
use crate::error::ComputeError;
use crate::memory::Memory;
use crate::predicate::{DeploymentExecutor, ModelExecutor};
use crate::sort::sort_view;
use crate::stage::run_pipeline;
use crate::view::{ParsedView, ViewKind};
use archview_model::{Fqn, ModelGraph};
use std::collections::HashSet;
use tracing::debug;

/// Compute a single view.
///
/// Pure and synchronous: the same inputs always produce the same output.
/// `navigate_to` is only derived from other views when computing through a
/// [`ViewCatalog`](crate::ViewCatalog).
pub fn compute_view(
    view: &ParsedView,
    graph: &ModelGraph,
    config: &ComputeConfig,
) -> Result<ComputedView, ComputeError> {
    compute_with_scopes(view, graph, config, &ScopeIndex::default())
}

pub(crate) fn compute_with_scopes(
    view: &ParsedView,
    graph: &ModelGraph,
    config: &ComputeConfig,
    scopes: &ScopeIndex,
) -> Result<ComputedView, ComputeError> {
    if let Some(scope) = &view.view_of {
        if view.kind != ViewKind::Deployment && !graph.contains(scope) {
            return Err(ComputeError::UnknownElement {
                view: view.id.clone(),
                fqn: scope.clone(),
            });
        }
    }

    let builder = NodeBuilder::new(graph, &view.id, scopes, config);
    match view.kind {
        ViewKind::Element => {
            let exec = ModelExecutor::new(graph, &view.id, view.view_of.as_ref());
            let memory = run_pipeline(&exec, &view.rules, config)?;
            let mut nodes = builder.element_nodes(&memory);
            nodes.sort_by_key(|n| graph.declaration_index(&n.id).unwrap_or(usize::MAX));
            Ok(assemble(view, graph, memory, nodes))
        }
        ViewKind::Deployment => {
            let exec = DeploymentExecutor::new(graph, &view.id);
            let memory = run_pipeline(&exec, &view.rules, config)?;
            let mut nodes = builder.deployment_nodes(&memory);
            nodes.sort_by_key(|n| {
                graph
                    .deployment_declaration_index(&n.id)
                    .unwrap_or(usize::MAX)
            });
            Ok(assemble(view, graph, memory, nodes))
        }
        ViewKind::Dynamic => dynamic::resolve(view, graph, config, scopes),
    }
}

fn assemble(
    view: &ParsedView,
    graph: &ModelGraph,
    memory: Memory,
    nodes: Vec<ComputedNode>,
) -> ComputedView {
    let ids: HashSet<Fqn> = nodes.iter().map(|n| n.id.clone()).collect();
    let edges = connection_edges(graph, &memory.connections, &ids);
    let (mut nodes, edges) = sort_view(nodes, edges);
    link_hierarchy(&mut nodes);
    link_edges(&mut nodes, &edges);

    debug!(
        view = %view.id,
        kind = ?view.kind,
        nodes = nodes.len(),
        edges = edges.len(),
        "view computed"
    );

    ComputedView {
        id: view.id.clone(),
        kind: view.kind,
        title: view.title.clone(),
        description: view.description.clone(),
        view_of: view.view_of.clone(),
        auto_layout: memory.auto_layout,
        nodes,
        edges,
        steps: Vec::new(),
        branch_collections: Vec::new(),
    }
}
