//! Merging of relationships that collapse onto one computed edge.

use archview_model::{ArrowType, Fqn, LineStyle, Relationship, ViewId};
use std::collections::BTreeSet;

/// Label shown when contributing relationships disagree on their titles.
pub const MIXED_TITLE: &str = "[...]";

/// Properties shared by the relationships behind one edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedRelation {
    pub label: Option<String>,
    pub description: Option<String>,
    pub technology: Option<String>,
    pub kind: Option<String>,
    pub tags: BTreeSet<String>,
    pub color: Option<String>,
    pub line: Option<LineStyle>,
    pub head: Option<ArrowType>,
    pub tail: Option<ArrowType>,
    pub navigate_to: Option<ViewId>,
}

/// `Some(v)` if every contributor sets the field to the same `v`.
fn unanimous<'a, T, I>(mut values: I) -> Option<T>
where
    T: PartialEq + Clone + 'a,
    I: Iterator<Item = Option<&'a T>>,
{
    let first = values.next()??;
    values
        .all(|value| value == Some(first))
        .then(|| first.clone())
}

/// Distinct non-empty values in first-seen order.
fn distinct<'a>(values: impl Iterator<Item = Option<&'a String>>) -> Vec<&'a String> {
    let mut out: Vec<&String> = Vec::new();
    for value in values.flatten() {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

/// Merge `relations` drawn between `source` and `target`.
///
/// The preferred relationship, one whose endpoints are exactly the edge
/// endpoints, overrides every field it sets itself.
pub fn merge_relations(relations: &[&Relationship], source: &Fqn, target: &Fqn) -> MergedRelation {
    if relations.is_empty() {
        return MergedRelation::default();
    }

    let titles = distinct(relations.iter().map(|r| r.title.as_ref()));
    let technologies = distinct(relations.iter().map(|r| r.technology.as_ref()));
    let label = match titles.as_slice() {
        [single] => Some((*single).clone()),
        [] => match technologies.as_slice() {
            [single] => Some(format!("[{single}]")),
            _ => None,
        },
        _ => Some(MIXED_TITLE.to_string()),
    };

    let mut merged = MergedRelation {
        label,
        description: unanimous(relations.iter().map(|r| r.description.as_ref())),
        technology: unanimous(relations.iter().map(|r| r.technology.as_ref())),
        kind: unanimous(relations.iter().map(|r| r.kind.as_ref())),
        tags: relations
            .iter()
            .flat_map(|r| r.tags.iter().cloned())
            .collect(),
        color: unanimous(relations.iter().map(|r| r.color.as_ref())),
        line: unanimous(relations.iter().map(|r| r.line.as_ref())),
        head: unanimous(relations.iter().map(|r| r.head.as_ref())),
        tail: unanimous(relations.iter().map(|r| r.tail.as_ref())),
        navigate_to: unanimous(relations.iter().map(|r| r.navigate_to.as_ref())),
    };

    let preferred = relations
        .iter()
        .find(|r| &r.source == source && &r.target == target);
    if let Some(preferred) = preferred {
        override_with(&mut merged, preferred);
    }
    merged
}

fn override_with(merged: &mut MergedRelation, preferred: &Relationship) {
    if preferred.title.is_some() {
        merged.label.clone_from(&preferred.title);
    }
    if preferred.description.is_some() {
        merged.description.clone_from(&preferred.description);
    }
    if preferred.technology.is_some() {
        merged.technology.clone_from(&preferred.technology);
    }
    if preferred.kind.is_some() {
        merged.kind.clone_from(&preferred.kind);
    }
    if preferred.color.is_some() {
        merged.color.clone_from(&preferred.color);
    }
    if preferred.line.is_some() {
        merged.line = preferred.line;
    }
    if preferred.head.is_some() {
        merged.head = preferred.head;
    }
    if preferred.tail.is_some() {
        merged.tail = preferred.tail;
    }
    if preferred.navigate_to.is_some() {
        merged.navigate_to.clone_from(&preferred.navigate_to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fqn(s: &str) -> Fqn {
        Fqn::new(s).unwrap()
    }

    fn rel(id: &str) -> Relationship {
        Relationship::new(id, fqn("a.x"), fqn("b.y"))
    }

    #[test]
    fn differing_titles_collapse() {
        let r1 = rel("r1").with_title("reads").with_color("red").with_tag("sync");
        let r2 = rel("r2").with_title("writes").with_color("blue").with_tag("async");
        let merged = merge_relations(&[&r1, &r2], &fqn("a"), &fqn("b"));
        assert_eq!(merged.label.as_deref(), Some(MIXED_TITLE));
        assert_eq!(merged.color, None);
        assert_eq!(
            merged.tags.into_iter().collect::<Vec<_>>(),
            vec!["async".to_string(), "sync".to_string()]
        );
    }

    #[test]
    fn technology_becomes_label_without_title() {
        let r1 = rel("r1").with_technology("gRPC").with_line(LineStyle::Dashed);
        let r2 = rel("r2").with_technology("gRPC").with_line(LineStyle::Dashed);
        let merged = merge_relations(&[&r1, &r2], &fqn("a"), &fqn("b"));
        assert_eq!(merged.label.as_deref(), Some("[gRPC]"));
        assert_eq!(merged.technology.as_deref(), Some("gRPC"));
        assert_eq!(merged.line, Some(LineStyle::Dashed));
    }

    #[test]
    fn same_title_is_kept() {
        let r1 = rel("r1").with_title("calls");
        let r2 = rel("r2").with_title("calls").with_technology("http");
        let merged = merge_relations(&[&r1, &r2], &fqn("a"), &fqn("b"));
        assert_eq!(merged.label.as_deref(), Some("calls"));
        // Only one contributor sets it.
        assert_eq!(merged.technology, None);
    }

    #[test]
    fn preferred_relationship_overrides() {
        let generic = rel("r1").with_title("uses").with_color("red");
        let exact = Relationship::new("r2", fqn("a"), fqn("b"))
            .with_title("owns")
            .with_color("green");
        let merged = merge_relations(&[&generic, &exact], &fqn("a"), &fqn("b"));
        assert_eq!(merged.label.as_deref(), Some("owns"));
        assert_eq!(merged.color.as_deref(), Some("green"));
    }
}
