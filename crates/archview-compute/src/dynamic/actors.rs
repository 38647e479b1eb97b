//! Actor lane ordering.

use super::ingest::StepInput;
use archview_model::Fqn;

/// Lane order of the elements taking part in `steps`.
///
/// Forward steps append unseen endpoints. A backward step places an unseen
/// source directly before its target, so responses read right to left.
pub fn order_actors<'a>(steps: impl IntoIterator<Item = &'a StepInput>) -> Vec<Fqn> {
    let mut actors: Vec<Fqn> = Vec::new();
    for step in steps {
        if step.is_backward {
            let target = position_or_append(&mut actors, &step.target);
            if !actors.contains(&step.source) {
                actors.insert(target, step.source.clone());
            }
        } else {
            position_or_append(&mut actors, &step.source);
            position_or_append(&mut actors, &step.target);
        }
    }
    actors
}

fn position_or_append(actors: &mut Vec<Fqn>, fqn: &Fqn) -> usize {
    match actors.iter().position(|a| a == fqn) {
        Some(pos) => pos,
        None => {
            actors.push(fqn.clone());
            actors.len() - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fqn(s: &str) -> Fqn {
        Fqn::new(s).unwrap()
    }

    fn forward(s: &str, t: &str) -> StepInput {
        StepInput::new(fqn(s), fqn(t))
    }

    #[test]
    fn forward_steps_append_in_first_seen_order() {
        let steps = [forward("a", "b"), forward("b", "c"), forward("c", "a")];
        assert_eq!(order_actors(&steps), vec![fqn("a"), fqn("b"), fqn("c")]);
    }

    #[test]
    fn backward_step_inserts_new_source_before_target() {
        let steps = [forward("a", "b"), forward("x", "b").backward()];
        assert_eq!(order_actors(&steps), vec![fqn("a"), fqn("x"), fqn("b")]);
    }

    #[test]
    fn backward_step_with_known_source_only_adds_target() {
        let steps = [forward("a", "b"), forward("b", "c").backward()];
        assert_eq!(order_actors(&steps), vec![fqn("a"), fqn("b"), fqn("c")]);
    }
}
