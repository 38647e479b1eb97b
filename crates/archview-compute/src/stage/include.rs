use super::connect::Topology;
use crate::error::ComputeError;
use crate::expr::Expr;
use crate::memory::Memory;
use crate::predicate::{PredicateExecutor, Resolved};
use tracing::{debug, trace};

/// Include stage followed by a connect stage.
pub fn apply<E>(exec: &E, exprs: &[Expr], mut memory: Memory) -> Result<Memory, ComputeError>
where
    E: PredicateExecutor + Topology,
{
    for expr in exprs {
        exec.classify(expr)?;
        let resolved = exec.include(expr);
        if resolved.is_empty() {
            debug!(view = %exec.view(), %expr, "include matched nothing");
        }
        match resolved {
            Resolved::Elements { explicit, implicit } => {
                for fqn in explicit {
                    memory.elements.insert(fqn.clone());
                    memory.finals.insert(fqn.clone());
                    memory.explicits.insert(fqn);
                }
                for fqn in implicit {
                    memory.elements.insert(fqn.clone());
                    memory.finals.insert(fqn);
                }
            }
            Resolved::Relations {
                endpoints,
                relations,
            } => {
                memory.elements.extend(endpoints);
                for relation in &relations {
                    memory.lift_exclusion(relation);
                }
            }
        }
        trace!(view = %exec.view(), %expr, elements = memory.elements.len(), "include");
    }
    memory.connections = exec.connect(&memory);
    Ok(memory)
}
