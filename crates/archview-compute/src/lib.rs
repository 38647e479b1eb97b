//! View computation engine.
//!
//! Turns a [`ModelGraph`](archview_model::ModelGraph) and a rule-based
//! [`ParsedView`] into a render-ready [`ComputedView`]:
//!
//! ```text
//! ParsedView ──► predicate executors ──► stage pipeline (Memory fold)
//!                                              │
//!            dynamic resolver ◄── steps ───────┤
//!                                              ▼
//!                                   node/edge builder ──► sorter ──► ComputedView
//! ```
//!
//! Computation is pure and synchronous. The only async surface is the
//! [`LayoutEngine`] boundary for external pixel layout.
//!
//! # Example
//!
//! ```
//! use archview_compute::{compute_view, ComputeConfig, ElementExpr, ParsedView};
//! use archview_model::{Element, Fqn, ModelGraph, Relationship};
//!
//! let fqn = |s: &str| Fqn::new(s).unwrap();
//! let graph = ModelGraph::builder()
//!     .element(Element::new(fqn("a"), "system"))
//!     .element(Element::new(fqn("a.b"), "container"))
//!     .element(Element::new(fqn("c"), "system"))
//!     .element(Element::new(fqn("c.d"), "container"))
//!     .relationship(Relationship::new("r1", fqn("a.b"), fqn("c.d")))
//!     .build()
//!     .unwrap();
//!
//! let view = ParsedView::element("landscape")
//!     .include([ElementExpr::exact(fqn("a")), ElementExpr::exact(fqn("c"))]);
//! let computed = compute_view(&view, &graph, &ComputeConfig::default()).unwrap();
//!
//! assert_eq!(computed.nodes.len(), 2);
//! assert_eq!(computed.edges[0].id, "a:c");
//! ```

mod builder;
mod catalog;
mod compute;
mod computed;
mod config;
pub mod dynamic;
mod error;
mod expr;
mod layout;
mod memory;
mod merge;
pub mod predicate;
mod sort;
pub mod stage;
mod view;

pub use catalog::{ScopeIndex, ViewCatalog};
pub use compute::compute_view;
pub use computed::{
    BranchCollection, BranchKind, BranchPath, BranchTrail, ComputedEdge, ComputedNode,
    ComputedStep, ComputedView, EdgeId,
};
pub use config::ComputeConfig;
pub use dynamic::{RawBranch, RawPath, RawStep, StepInput};
pub use error::{ComputeError, LayoutError};
pub use expr::{DeploymentExpr, ElementExpr, Expr, RelationExpr, Selector};
pub use layout::{layout_view, EdgeLayout, LayoutEngine, LayoutedView, NodeLayout, Point};
pub use memory::{Connection, ExclusionKey, Memory, OrderedSet};
pub use merge::{merge_relations, MergedRelation, MIXED_TITLE};
pub use sort::{sort_edges, sort_view};
pub use view::{AutoLayout, LayoutDirection, ParsedView, StyleRule, ViewKind, ViewRule};
