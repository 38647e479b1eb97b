//! Relation expressions over model relationships.

use crate::expr::{ElementExpr, RelationExpr, Selector};
use archview_model::{Fqn, ModelGraph, Relationship};

/// Closest element selected by `expr` that contains the relationship end
/// `end`. Wildcards and descendant selectors keep the end itself.
pub(super) fn endpoint(graph: &ModelGraph, expr: &ElementExpr, end: &Fqn) -> Option<Fqn> {
    let mut self_and_ancestors = std::iter::once(end.clone()).chain(end.ancestors());
    match expr {
        ElementExpr::Wildcard => Some(end.clone()),
        ElementExpr::Ref { fqn, selector } => match selector {
            Selector::Exact => end.is_within(fqn).then(|| fqn.clone()),
            Selector::Children => self_and_ancestors.find(|a| a.parent().as_ref() == Some(fqn)),
            Selector::Descendants => end.is_descendant_of(fqn).then(|| end.clone()),
            Selector::Ancestors => graph.ancestors(fqn).into_iter().find(|a| end.is_within(a)),
        },
        ElementExpr::Kind { kind, negate } => self_and_ancestors.find(|a| {
            graph
                .element(a)
                .is_some_and(|e| (&e.kind == kind) != *negate)
        }),
        ElementExpr::Tag { tag, negate } => self_and_ancestors.find(|a| {
            graph
                .element(a)
                .is_some_and(|e| e.tags.contains(tag) != *negate)
        }),
    }
}

fn pair(source: Option<Fqn>, target: Option<Fqn>) -> Option<(Fqn, Fqn)> {
    match (source, target) {
        (Some(s), Some(t)) if !s.same_hierarchy(&t) => Some((s, t)),
        _ => None,
    }
}

fn incoming(graph: &ModelGraph, target: &ElementExpr, rel: &Relationship) -> Option<(Fqn, Fqn)> {
    let t = endpoint(graph, target, &rel.target)?;
    if rel.source.is_within(&t) {
        return None;
    }
    pair(Some(rel.source.clone()), Some(t))
}

fn outgoing(graph: &ModelGraph, source: &ElementExpr, rel: &Relationship) -> Option<(Fqn, Fqn)> {
    let s = endpoint(graph, source, &rel.source)?;
    if rel.target.is_within(&s) {
        return None;
    }
    pair(Some(s), Some(rel.target.clone()))
}

/// If `rel` matches `expr`, the pair of elements it is drawn between.
pub(super) fn match_relationship(
    graph: &ModelGraph,
    expr: &RelationExpr,
    rel: &Relationship,
) -> Option<(Fqn, Fqn)> {
    match expr {
        RelationExpr::Direct {
            source,
            target,
            bidirectional,
        } => pair(
            endpoint(graph, source, &rel.source),
            endpoint(graph, target, &rel.target),
        )
        .or_else(|| {
            if *bidirectional {
                pair(
                    endpoint(graph, target, &rel.source),
                    endpoint(graph, source, &rel.target),
                )
            } else {
                None
            }
        }),
        RelationExpr::Incoming { target } => incoming(graph, target, rel),
        RelationExpr::Outgoing { source } => outgoing(graph, source, rel),
        RelationExpr::InOut { element } => {
            incoming(graph, element, rel).or_else(|| outgoing(graph, element, rel))
        }
    }
}
