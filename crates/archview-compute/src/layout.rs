//! External layout boundary.
//!
//! Pixel geometry is produced by an external engine. The engine is awaited
//! under a deadline; dropping the returned future cancels the call.

use crate::computed::{ComputedView, EdgeId};
use crate::error::{ComputeError, LayoutError};
use archview_model::Fqn;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLayout {
    pub id: Fqn,
    /// Top-left corner.
    pub position: Point,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeLayout {
    pub id: EdgeId,
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_position: Option<Point>,
}

/// A computed view with geometry attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutedView {
    pub view: ComputedView,
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
}

/// A layout engine (graphviz, elk, ...) living outside the core.
#[async_trait]
pub trait LayoutEngine: Send + Sync {
    async fn layout(&self, view: &ComputedView) -> Result<LayoutedView, LayoutError>;
}

/// Lay out `view`, giving up after `timeout`.
pub async fn layout_view<E>(
    engine: &E,
    view: &ComputedView,
    timeout: Duration,
) -> Result<LayoutedView, ComputeError>
where
    E: LayoutEngine + ?Sized,
{
    match tokio::time::timeout(timeout, engine.layout(view)).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            let after_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            warn!(view = %view.id, after_ms, "layout timed out");
            Err(LayoutError::TimedOut {
                view: view.id.clone(),
                after_ms,
            }
            .into())
        }
    }
}
