//! Working state of the stage pipeline.
//!
//! A `Memory` value is owned by exactly one pipeline run. Stages take it by
//! value and hand back the next snapshot; nothing else holds a reference to it.

use crate::view::AutoLayout;
use archview_model::{ElementStyle, Fqn, RelationId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::hash::Hash;

/// Insertion-ordered set.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct OrderedSet<T: Eq + Hash + Clone> {
    items: Vec<T>,
    #[serde(skip)]
    index: HashSet<T>,
}

impl<T: Eq + Hash + Clone> Default for OrderedSet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashSet::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq + Hash + Clone> Eq for OrderedSet<T> {}

impl<T: Eq + Hash + Clone> OrderedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the end; returns false if already present.
    pub fn insert(&mut self, item: T) -> bool {
        if self.index.contains(&item) {
            return false;
        }
        self.index.insert(item.clone());
        self.items.push(item);
        true
    }

    pub fn remove(&mut self, item: &T) -> bool {
        if !self.index.remove(item) {
            return false;
        }
        self.items.retain(|existing| existing != item);
        true
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        let index = &mut self.index;
        self.items.retain(|item| {
            let kept = keep(item);
            if !kept {
                index.remove(item);
            }
            kept
        });
    }

    pub fn contains(&self, item: &T) -> bool {
        self.index.contains(item)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Eq + Hash + Clone> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl<T: Eq + Hash + Clone> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<'a, T: Eq + Hash + Clone> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A resolved connection between two in-view elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub source: Fqn,
    pub target: Fqn,
    /// Underlying relationships, in declaration order.
    pub relations: Vec<RelationId>,
}

impl Connection {
    pub fn touches(&self, fqn: &Fqn) -> bool {
        &self.source == fqn || &self.target == fqn
    }
}

/// A relationship removed by an exclude rule.
///
/// `between: None` excludes the relationship wherever it would be drawn;
/// `Some((source, target))` only between that pair of in-view elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ExclusionKey {
    pub relation: RelationId,
    pub between: Option<(Fqn, Fqn)>,
}

impl ExclusionKey {
    pub fn global(relation: RelationId) -> Self {
        Self {
            relation,
            between: None,
        }
    }

    pub fn between(relation: RelationId, source: Fqn, target: Fqn) -> Self {
        Self {
            relation,
            between: Some((source, target)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Memory {
    /// Every element that becomes a node, in first-inclusion order.
    pub elements: OrderedSet<Fqn>,
    /// Named directly by the author; never pruned.
    pub explicits: OrderedSet<Fqn>,
    /// Included by an element predicate rather than as a connection endpoint.
    pub finals: OrderedSet<Fqn>,
    pub connections: Vec<Connection>,
    pub excluded: BTreeSet<ExclusionKey>,
    /// Accumulated style overrides per element.
    pub styles: BTreeMap<Fqn, ElementStyle>,
    pub auto_layout: Option<AutoLayout>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `relation` may not be drawn between `source` and `target`.
    pub fn is_excluded(&self, relation: &RelationId, source: &Fqn, target: &Fqn) -> bool {
        self.excluded.contains(&ExclusionKey::global(relation.clone()))
            || self.excluded.contains(&ExclusionKey::between(
                relation.clone(),
                source.clone(),
                target.clone(),
            ))
    }

    /// Forget every exclusion of `relation`.
    pub fn lift_exclusion(&mut self, relation: &RelationId) {
        self.excluded.retain(|key| &key.relation != relation);
    }

    /// Remove an element and every connection touching it.
    pub fn remove_element(&mut self, fqn: &Fqn) {
        self.elements.remove(fqn);
        self.explicits.remove(fqn);
        self.finals.remove(fqn);
        self.connections.retain(|c| !c.touches(fqn));
    }

    /// Drop connection-only endpoints that no longer touch any connection.
    pub fn drop_orphan_endpoints(&mut self) {
        let connections = &self.connections;
        let finals = &self.finals;
        self.elements
            .retain(|fqn| finals.contains(fqn) || connections.iter().any(|c| c.touches(fqn)));
    }

    pub fn connection(&self, source: &Fqn, target: &Fqn) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|c| &c.source == source && &c.target == target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fqn(s: &str) -> Fqn {
        Fqn::new(s).unwrap()
    }

    #[test]
    fn ordered_set_keeps_first_insertion_order() {
        let mut set: OrderedSet<Fqn> = [fqn("b"), fqn("a"), fqn("b")].into_iter().collect();
        assert_eq!(set.as_slice(), &[fqn("b"), fqn("a")]);
        assert!(set.remove(&fqn("b")));
        assert!(!set.contains(&fqn("b")));
        assert!(set.insert(fqn("b")));
        assert_eq!(set.as_slice(), &[fqn("a"), fqn("b")]);
    }

    #[test]
    fn orphan_endpoints_are_dropped() {
        let mut memory = Memory::new();
        memory.elements.extend([fqn("a"), fqn("b"), fqn("c")]);
        memory.finals.insert(fqn("a"));
        memory.connections.push(Connection {
            source: fqn("a"),
            target: fqn("b"),
            relations: vec![RelationId::new("r1")],
        });

        memory.drop_orphan_endpoints();
        assert_eq!(memory.elements.as_slice(), &[fqn("a"), fqn("b")]);

        memory.remove_element(&fqn("a"));
        memory.drop_orphan_endpoints();
        assert!(memory.elements.is_empty());
    }

    #[test]
    fn exclusion_keys() {
        let mut memory = Memory::new();
        let r = RelationId::new("r");
        memory
            .excluded
            .insert(ExclusionKey::between(r.clone(), fqn("a"), fqn("b")));
        assert!(memory.is_excluded(&r, &fqn("a"), &fqn("b")));
        assert!(!memory.is_excluded(&r, &fqn("a"), &fqn("c")));
        memory.lift_exclusion(&r);
        assert!(!memory.is_excluded(&r, &fqn("a"), &fqn("b")));
    }
}
