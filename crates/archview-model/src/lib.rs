//! Architecture model graph.
//!
//! This crate holds the read-only input of view computation:
//! - `Fqn` - dot-separated hierarchical identifiers
//! - `Element` - hierarchical nodes with kind, tags and style tokens
//! - `Relationship` - directed edges that never stay inside one hierarchy chain
//! - `DeploymentElement` - deployment nodes and deployed instances
//! - `ModelGraph` - validated, indexed snapshot of all of the above
//!
//! # Example
//!
//! ```
//! use archview_model::{Element, Fqn, ModelGraph, Relationship};
//!
//! let a = Fqn::new("a").unwrap();
//! let ab = Fqn::new("a.b").unwrap();
//! let c = Fqn::new("c").unwrap();
//!
//! let graph = ModelGraph::builder()
//!     .element(Element::new(a.clone(), "system"))
//!     .element(Element::new(ab.clone(), "container"))
//!     .element(Element::new(c.clone(), "system"))
//!     .relationship(Relationship::new("r1", ab.clone(), c.clone()))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(graph.relationships_between(&a, &c).len(), 1);
//! ```

mod deployment;
mod document;
mod element;
mod error;
mod fqn;
mod graph;
mod relationship;

pub use deployment::DeploymentElement;
pub use document::ModelDocument;
pub use element::{BorderStyle, Element, ElementStyle, Link, Shape, ViewId};
pub use error::ModelError;
pub use fqn::{Fqn, FqnError, SEPARATOR};
pub use graph::{ModelGraph, ModelGraphBuilder};
pub use relationship::{ArrowType, LineStyle, RelationId, Relationship};
