//! Shared fixtures for view computation tests.
#![allow(dead_code)]

use archview_model::{DeploymentElement, Element, Fqn, ModelGraph, Relationship};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test subscriber once per binary. `RUST_LOG` controls the filter.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

pub fn fqn(s: &str) -> Fqn {
    Fqn::new(s).unwrap()
}

/// A small online shop:
///
/// ```text
/// customer ──► shop.web ──► shop.api ──► shop.db
///                               └──────► bank.gateway
/// ```
pub fn shop() -> ModelGraph {
    ModelGraph::builder()
        .element(Element::new(fqn("customer"), "actor").with_title("Customer"))
        .element(Element::new(fqn("shop"), "system").with_title("Shop"))
        .element(Element::new(fqn("shop.web"), "container").with_technology("React"))
        .element(Element::new(fqn("shop.api"), "container").with_technology("Rust"))
        .element(Element::new(fqn("shop.db"), "database").with_tag("storage"))
        .element(Element::new(fqn("bank"), "system").with_tag("external"))
        .element(Element::new(fqn("bank.gateway"), "container"))
        .relationship(Relationship::new("r1", fqn("customer"), fqn("shop.web")).with_title("browses"))
        .relationship(
            Relationship::new("r2", fqn("shop.web"), fqn("shop.api"))
                .with_technology("https")
                .with_tag("sync"),
        )
        .relationship(Relationship::new("r3", fqn("shop.api"), fqn("shop.db")).with_title("reads"))
        .relationship(
            Relationship::new("r4", fqn("shop.api"), fqn("bank.gateway"))
                .with_title("charges")
                .with_color("red"),
        )
        .relationship(
            Relationship::new("r5", fqn("shop.web"), fqn("bank.gateway"))
                .with_title("redirects")
                .with_color("blue")
                .with_tag("async"),
        )
        .deployment(DeploymentElement::node(fqn("prod"), "environment"))
        .deployment(DeploymentElement::node(fqn("prod.eu"), "zone"))
        .deployment(DeploymentElement::instance(fqn("prod.eu.api"), fqn("shop.api")))
        .deployment(DeploymentElement::instance(fqn("prod.eu.db"), fqn("shop.db")))
        .deployment(DeploymentElement::node(fqn("prod.us"), "zone"))
        .deployment(DeploymentElement::instance(fqn("prod.us.api"), fqn("shop.api")))
        .build()
        .unwrap()
}

pub fn node_ids(view: &archview_compute::ComputedView) -> Vec<&str> {
    view.nodes.iter().map(|n| n.id.as_str()).collect()
}

pub fn edge_ids(view: &archview_compute::ComputedView) -> Vec<&str> {
    view.edges.iter().map(|e| e.id.as_str()).collect()
}
