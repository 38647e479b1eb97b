use super::connect::Topology;
use crate::config::ComputeConfig;
use crate::error::ComputeError;
use crate::expr::Expr;
use crate::memory::Memory;
use crate::predicate::{Predicate, PredicateExecutor};
use archview_model::{Fqn, RelationId};
use tracing::{debug, trace};

/// Exclude stage: remove matches, drop orphaned endpoints, then prune.
pub fn apply<E>(
    exec: &E,
    exprs: &[Expr],
    mut memory: Memory,
    config: &ComputeConfig,
) -> Result<Memory, ComputeError>
where
    E: PredicateExecutor + Topology,
{
    for expr in exprs {
        match exec.classify(expr)? {
            Predicate::Elements => {
                let removed: Vec<Fqn> = memory
                    .elements
                    .iter()
                    .filter(|fqn| exec.matches(expr, fqn))
                    .cloned()
                    .collect();
                for fqn in &removed {
                    memory.remove_element(fqn);
                }
                trace!(view = %exec.view(), %expr, removed = removed.len(), "exclude elements");
            }
            Predicate::Relations => {
                let mut connections = std::mem::take(&mut memory.connections);
                for connection in &mut connections {
                    let current = &*connection;
                    let dropped: Vec<RelationId> = current
                        .relations
                        .iter()
                        .filter(|r| exec.matches_relation(expr, current, r))
                        .cloned()
                        .collect();
                    for relation in &dropped {
                        memory
                            .excluded
                            .insert(exec.exclusion_key(relation, current));
                    }
                    connection.relations.retain(|r| !dropped.contains(r));
                }
                connections.retain(|c| !c.relations.is_empty());
                memory.connections = connections;
                trace!(view = %exec.view(), %expr, excluded = memory.excluded.len(), "exclude relations");
            }
        }
    }
    memory.drop_orphan_endpoints();
    if config.prune_after_exclude {
        memory = prune(exec, memory);
    }
    Ok(memory)
}

/// Remove structural parents that lost all in-view descendants.
///
/// Only runs while the view has no connections at all. Explicit elements
/// are never removed. Repeats until a pass removes nothing.
pub fn prune<E>(exec: &E, mut memory: Memory) -> Memory
where
    E: PredicateExecutor + Topology,
{
    if !memory.connections.is_empty() {
        return memory;
    }
    loop {
        let doomed: Vec<Fqn> = memory
            .elements
            .iter()
            .filter(|fqn| {
                !memory.explicits.contains(fqn)
                    && exec.is_structural_parent(fqn)
                    && !memory.elements.iter().any(|other| other.is_descendant_of(fqn))
            })
            .cloned()
            .collect();
        if doomed.is_empty() {
            break;
        }
        for fqn in &doomed {
            debug!(view = %exec.view(), element = %fqn, "pruned orphaned container");
            memory.remove_element(fqn);
        }
    }
    memory
}
