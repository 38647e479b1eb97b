use crate::error::ComputeError;
use crate::memory::Memory;
use crate::predicate::{Predicate, PredicateExecutor};
use crate::view::StyleRule;

/// Apply style rules in declaration order over the final element set.
/// Later rules override earlier ones field by field.
pub fn apply<E>(exec: &E, rules: &[&StyleRule], mut memory: Memory) -> Result<Memory, ComputeError>
where
    E: PredicateExecutor,
{
    for rule in rules {
        for target in &rule.targets {
            if exec.classify(target)? == Predicate::Relations {
                return Err(ComputeError::ExpressionKindMismatch {
                    view: exec.view().clone(),
                    kind: exec.kind(),
                    expr: target.to_string(),
                });
            }
        }
        for fqn in memory.elements.iter() {
            if rule.targets.iter().any(|t| exec.matches(t, fqn)) {
                memory
                    .styles
                    .entry(fqn.clone())
                    .or_default()
                    .apply(&rule.style);
            }
        }
    }
    Ok(memory)
}
