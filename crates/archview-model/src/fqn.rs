//! Fully-qualified names.
//!
//! Every element and deployment element is keyed by a dot-separated path
//! (`cloud.backend.api`). The hierarchy is encoded in the name itself, so
//! ancestor/descendant checks are string-prefix checks and never need a lookup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Segment separator.
pub const SEPARATOR: char = '.';

/// Errors raised while constructing an [`Fqn`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FqnError {
    #[error("fully-qualified name is empty")]
    Empty,

    #[error("empty segment in fully-qualified name '{0}'")]
    EmptySegment(String),

    #[error("invalid character {ch:?} in fully-qualified name '{name}'")]
    InvalidCharacter { name: String, ch: char },
}

/// A validated, dot-separated hierarchical identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fqn(String);

impl Fqn {
    /// Create a new FQN, validating its segments.
    pub fn new(value: impl Into<String>) -> Result<Self, FqnError> {
        let value = value.into();
        if value.is_empty() {
            return Err(FqnError::Empty);
        }
        if let Some(ch) = value
            .chars()
            .find(|c| c.is_whitespace() || *c == ':' || *c == '*')
        {
            return Err(FqnError::InvalidCharacter { name: value, ch });
        }
        if value.split(SEPARATOR).any(str::is_empty) {
            return Err(FqnError::EmptySegment(value));
        }
        Ok(Self(value))
    }

    /// The raw string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment.
    pub fn name(&self) -> &str {
        self.0.rsplit(SEPARATOR).next().unwrap_or(&self.0)
    }

    /// Iterate over the segments, root first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// Number of ancestors (0 for a root).
    pub fn depth(&self) -> usize {
        self.0.matches(SEPARATOR).count()
    }

    /// Direct parent, `None` for roots.
    pub fn parent(&self) -> Option<Fqn> {
        self.0.rfind(SEPARATOR).map(|idx| Fqn(self.0[..idx].to_string()))
    }

    /// All ancestors, closest first.
    pub fn ancestors(&self) -> impl Iterator<Item = Fqn> {
        std::iter::successors(self.parent(), Fqn::parent)
    }

    /// Append a child segment.
    pub fn child(&self, name: &str) -> Result<Fqn, FqnError> {
        Fqn::new(format!("{}{}{}", self.0, SEPARATOR, name))
    }

    /// True if `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &Fqn) -> bool {
        other.0.len() > self.0.len()
            && other.0.starts_with(&self.0)
            && other.0.as_bytes()[self.0.len()] == SEPARATOR as u8
    }

    /// True if `self` is a strict descendant of `other`.
    pub fn is_descendant_of(&self, other: &Fqn) -> bool {
        other.is_ancestor_of(self)
    }

    /// True if `self` equals `other` or is nested inside it.
    pub fn is_within(&self, other: &Fqn) -> bool {
        self == other || self.is_descendant_of(other)
    }

    /// True if both names lie on one ancestor chain (including equality).
    pub fn same_hierarchy(&self, other: &Fqn) -> bool {
        self == other || self.is_ancestor_of(other) || other.is_ancestor_of(self)
    }

    /// Closest strict ancestor shared by both names.
    pub fn common_ancestor(&self, other: &Fqn) -> Option<Fqn> {
        self.ancestors().find(|a| a.is_ancestor_of(other))
    }
}

impl fmt::Display for Fqn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fqn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Fqn {
    type Error = FqnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Fqn::new(value)
    }
}

impl TryFrom<&str> for Fqn {
    type Error = FqnError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Fqn::new(value)
    }
}

impl FromStr for Fqn {
    type Err = FqnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Fqn::new(s)
    }
}

impl From<Fqn> for String {
    fn from(fqn: Fqn) -> Self {
        fqn.0
    }
}
