//! Stage pipeline.
//!
//! View rules are folded over a [`Memory`] in declaration order. Every stage
//! is a function `Memory -> Memory`; include stages are followed by a connect
//! stage, exclude stages by orphan cleanup and pruning. Style rules are
//! collected and applied last, once the element set is final.

mod connect;
pub mod exclude;
pub mod include;
pub mod style;

pub use connect::Topology;

use crate::config::ComputeConfig;
use crate::error::ComputeError;
use crate::memory::Memory;
use crate::predicate::PredicateExecutor;
use crate::view::ViewRule;
use tracing::debug;

/// Fold `rules` into a final memory snapshot.
pub fn run_pipeline<E>(
    exec: &E,
    rules: &[ViewRule],
    config: &ComputeConfig,
) -> Result<Memory, ComputeError>
where
    E: PredicateExecutor + Topology,
{
    run_pipeline_from(exec, rules, config, Memory::new())
}

/// Like [`run_pipeline`], starting from a seeded snapshot.
pub fn run_pipeline_from<E>(
    exec: &E,
    rules: &[ViewRule],
    config: &ComputeConfig,
    mut memory: Memory,
) -> Result<Memory, ComputeError>
where
    E: PredicateExecutor + Topology,
{
    let mut styles = Vec::new();

    for rule in rules {
        memory = match rule {
            ViewRule::Include { exprs } => include::apply(exec, exprs, memory)?,
            ViewRule::Exclude { exprs } => exclude::apply(exec, exprs, memory, config)?,
            ViewRule::Style(style) => {
                styles.push(style);
                memory
            }
            ViewRule::AutoLayout(layout) => {
                memory.auto_layout = Some(layout.clone());
                memory
            }
        };
    }

    let memory = style::apply(exec, &styles, memory)?;
    debug!(
        view = %exec.view(),
        elements = memory.elements.len(),
        connections = memory.connections.len(),
        "pipeline finished"
    );
    Ok(memory)
}
