//! Dynamic-view resolver.
//!
//! A dynamic view is an ordered sequence of interaction steps, optionally
//! grouped into nested alternate/parallel branch collections. Resolution runs
//! in four passes:
//!
//! 1. [`ingest`] raw steps into [`StepNode`]s, validating endpoints and ids
//! 2. drop steps touching excluded elements
//! 3. [`flatten`] into `step-NN` steps plus branch metadata
//! 4. order actors, run the element rules over them, build one edge per step

mod actors;
mod flatten;
mod ingest;

pub use actors::order_actors;
pub use flatten::{flatten, FlatStep, Flattened};
pub use ingest::{ingest, BranchNode, PathNode, RawBranch, RawPath, RawStep, StepInput, StepNode};

use crate::builder::{common_parent, link_edges, link_hierarchy, NodeBuilder};
use crate::catalog::ScopeIndex;
use crate::computed::{ComputedEdge, ComputedView};
use crate::config::ComputeConfig;
use crate::error::ComputeError;
use crate::expr::Expr;
use crate::memory::Memory;
use crate::merge::merge_relations;
use crate::predicate::ModelExecutor;
use crate::stage::run_pipeline_from;
use crate::view::{ParsedView, ViewRule};
use archview_model::{Fqn, ModelGraph};
use std::collections::HashSet;
use tracing::debug;

/// Resolve a dynamic view.
pub fn resolve(
    view: &ParsedView,
    graph: &ModelGraph,
    config: &ComputeConfig,
    scopes: &ScopeIndex,
) -> Result<ComputedView, ComputeError> {
    let exec = ModelExecutor::for_dynamic(graph, &view.id, view.view_of.as_ref());

    let nodes = ingest(&view.id, graph, &view.steps)?;
    let excluded = |fqn: &Fqn| {
        view.rules.iter().any(|rule| match rule {
            ViewRule::Exclude { exprs } => exprs.iter().any(|expr| match expr {
                Expr::Element(e) => exec.element_matches(e, fqn),
                _ => false,
            }),
            _ => false,
        })
    };
    let nodes = StepNode::retain_steps(nodes, &|step: &StepInput| {
        !excluded(&step.source) && !excluded(&step.target)
    });
    let flat = flatten(&nodes, config.dynamic_branches);

    let mut seeded = Memory::new();
    for actor in order_actors(flat.steps.iter().map(|f| &f.input)) {
        seeded.elements.insert(actor.clone());
        seeded.finals.insert(actor.clone());
        seeded.explicits.insert(actor);
    }
    let pipeline_config = ComputeConfig {
        prune_after_exclude: false,
        ..config.clone()
    };
    let memory = run_pipeline_from(&exec, &view.rules, &pipeline_config, seeded)?;

    let builder = NodeBuilder::new(graph, &view.id, scopes, config);
    let mut computed_nodes = builder.element_nodes(&memory);
    let ids: HashSet<Fqn> = computed_nodes.iter().map(|n| n.id.clone()).collect();

    let edges: Vec<ComputedEdge> = flat
        .steps
        .iter()
        .map(|flat_step| step_edge(graph, &ids, flat_step))
        .collect();

    link_hierarchy(&mut computed_nodes);
    link_edges(&mut computed_nodes, &edges);

    debug!(
        view = %view.id,
        steps = flat.steps.len(),
        branches = flat.collections.len(),
        actors = computed_nodes.len(),
        "dynamic view resolved"
    );

    Ok(ComputedView {
        id: view.id.clone(),
        kind: view.kind,
        title: view.title.clone(),
        description: view.description.clone(),
        view_of: view.view_of.clone(),
        auto_layout: memory.auto_layout,
        nodes: computed_nodes,
        edges,
        steps: flat.steps.into_iter().map(|f| f.step).collect(),
        branch_collections: flat.collections,
    })
}

fn step_edge(graph: &ModelGraph, ids: &HashSet<Fqn>, flat: &FlatStep) -> ComputedEdge {
    let FlatStep { step, input } = flat;
    let relations = graph.relationships_between(&step.source, &step.target);
    let merged = merge_relations(&relations, &step.source, &step.target);
    ComputedEdge {
        id: step.id.clone(),
        source: step.source.clone(),
        target: step.target.clone(),
        parent: common_parent(ids, &step.source, &step.target),
        relations: relations.iter().map(|r| r.id.clone()).collect(),
        label: input.title.clone().or(merged.label),
        description: input.description.clone().or(merged.description),
        technology: input.technology.clone().or(merged.technology),
        kind: merged.kind,
        tags: merged.tags,
        color: merged.color,
        line: merged.line,
        head: merged.head,
        tail: merged.tail,
        navigate_to: input.navigate_to.clone().or(merged.navigate_to),
        notes: input.notes.clone(),
        is_backward: step.is_backward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::computed::BranchKind;
    use crate::expr::ElementExpr;
    use archview_model::{Element, Relationship};
    use pretty_assertions::assert_eq;

    fn fqn(s: &str) -> Fqn {
        Fqn::new(s).unwrap()
    }

    fn graph() -> ModelGraph {
        ModelGraph::builder()
            .element(Element::new(fqn("customer"), "actor"))
            .element(Element::new(fqn("shop"), "system"))
            .element(Element::new(fqn("shop.api"), "container"))
            .element(Element::new(fqn("bank"), "system"))
            .element(Element::new(fqn("audit"), "system"))
            .relationship(
                Relationship::new("r1", fqn("shop.api"), fqn("bank"))
                    .with_title("charges")
                    .with_technology("https"),
            )
            .build()
            .unwrap()
    }

    fn resolve_view(view: &ParsedView) -> Result<ComputedView, ComputeError> {
        resolve(view, &graph(), &ComputeConfig::default(), &ScopeIndex::default())
    }

    #[test]
    fn steps_become_edges_with_overrides() {
        let view = ParsedView::dynamic("checkout")
            .step(StepInput::new(fqn("customer"), fqn("shop.api")).with_title("orders"))
            .step(StepInput::new(fqn("shop.api"), fqn("bank")))
            .step(
                StepInput::new(fqn("customer"), fqn("shop.api"))
                    .backward()
                    .with_notes("receipt"),
            );
        let computed = resolve_view(&view).unwrap();

        let ids: Vec<_> = computed.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["step-01", "step-02", "step-03"]);
        assert_eq!(computed.edges[0].label.as_deref(), Some("orders"));
        assert_eq!(computed.edges[1].label.as_deref(), Some("charges"));
        assert_eq!(computed.edges[1].technology.as_deref(), Some("https"));
        assert!(computed.edges[2].is_backward);
        assert_eq!(computed.edges[2].notes.as_deref(), Some("receipt"));

        let actors: Vec<_> = computed.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(actors, vec!["customer", "shop.api", "bank"]);
    }

    #[test]
    fn excluded_actor_drops_its_steps() {
        let view = ParsedView::dynamic("checkout")
            .step(StepInput::new(fqn("customer"), fqn("shop.api")))
            .step(StepInput::new(fqn("shop.api"), fqn("audit")))
            .exclude([ElementExpr::exact(fqn("audit"))]);
        let computed = resolve_view(&view).unwrap();
        assert_eq!(computed.steps.len(), 1);
        assert!(computed.node(&fqn("audit")).is_none());
    }

    #[test]
    fn include_rules_add_nodes_after_actors() {
        let view = ParsedView::dynamic("checkout")
            .step(StepInput::new(fqn("customer"), fqn("bank")))
            .include([ElementExpr::exact(fqn("audit"))]);
        let computed = resolve_view(&view).unwrap();
        let ids: Vec<_> = computed.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["customer", "bank", "audit"]);
    }

    #[test]
    fn branch_metadata_follows_config() {
        let view = ParsedView::dynamic("checkout")
            .step(StepInput::new(fqn("customer"), fqn("shop.api")))
            .step(RawBranch::new(
                BranchKind::Alternate,
                vec![
                    RawPath::new(vec![StepInput::new(fqn("shop.api"), fqn("bank")).into()])
                        .as_default(),
                    RawPath::new(vec![StepInput::new(fqn("shop.api"), fqn("audit")).into()]),
                ],
            ));
        let computed = resolve_view(&view).unwrap();
        assert_eq!(computed.branch_collections.len(), 1);
        let branch = &computed.branch_collections[0];
        assert_eq!(branch.branch_id, "branch-1");
        assert_eq!(branch.decision_step_id, "step-01");
        assert_eq!(branch.paths[1].path_id, "branch-1-path-2");

        let legacy = resolve(
            &view,
            &graph(),
            &ComputeConfig::legacy(),
            &ScopeIndex::default(),
        )
        .unwrap();
        assert_eq!(legacy.steps.len(), 3);
        assert!(legacy.branch_collections.is_empty());
    }

    #[test]
    fn relation_rules_are_rejected() {
        let view = ParsedView::dynamic("checkout")
            .step(StepInput::new(fqn("customer"), fqn("bank")))
            .include([crate::expr::RelationExpr::Incoming {
                target: ElementExpr::Wildcard,
            }]);
        assert_eq!(
            resolve_view(&view).unwrap_err().code(),
            "EXPRESSION_KIND_MISMATCH"
        );
    }
}
