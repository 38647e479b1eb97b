//! View catalog and batch computation.

use crate::compute::compute_with_scopes;
use crate::computed::ComputedView;
use crate::config::ComputeConfig;
use crate::error::ComputeError;
use crate::view::{ParsedView, ViewKind};
use archview_model::{Fqn, ModelGraph, ViewId};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Element views by the element they are scoped to, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct ScopeIndex {
    scoped: BTreeMap<Fqn, Vec<ViewId>>,
}

impl ScopeIndex {
    pub fn from_views<'a>(views: impl IntoIterator<Item = &'a ParsedView>) -> Self {
        let mut scoped: BTreeMap<Fqn, Vec<ViewId>> = BTreeMap::new();
        for view in views {
            if view.kind != ViewKind::Element {
                continue;
            }
            if let Some(scope) = &view.view_of {
                scoped.entry(scope.clone()).or_default().push(view.id.clone());
            }
        }
        Self { scoped }
    }

    /// First view scoped to `fqn` that is not `current`.
    pub fn first_scoped(&self, fqn: &Fqn, current: &ViewId) -> Option<&ViewId> {
        self.scoped.get(fqn)?.iter().find(|id| *id != current)
    }
}

/// Every parsed view of a project, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ViewCatalog {
    views: Vec<ParsedView>,
}

impl ViewCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_views(views: Vec<ParsedView>) -> Self {
        Self { views }
    }

    /// Parse a JSON array of views.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_views(serde_json::from_str(json)?))
    }

    pub fn push(&mut self, view: ParsedView) {
        self.views.push(view);
    }

    pub fn views(&self) -> &[ParsedView] {
        &self.views
    }

    pub fn get(&self, id: &ViewId) -> Option<&ParsedView> {
        self.views.iter().find(|v| &v.id == id)
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Compute one view, with `navigate_to` derived from the other views.
    pub fn compute(
        &self,
        id: &ViewId,
        graph: &ModelGraph,
        config: &ComputeConfig,
    ) -> Result<ComputedView, ComputeError> {
        let view = self
            .get(id)
            .ok_or_else(|| ComputeError::UnknownView(id.clone()))?;
        let scopes = ScopeIndex::from_views(&self.views);
        compute_with_scopes(view, graph, config, &scopes)
    }

    /// Compute every view. A failing view is logged and reported in place;
    /// the others are unaffected.
    pub fn compute_all(
        &self,
        graph: &ModelGraph,
        config: &ComputeConfig,
    ) -> Vec<(ViewId, Result<ComputedView, ComputeError>)> {
        let scopes = ScopeIndex::from_views(&self.views);
        let results: Vec<_> = self
            .views
            .iter()
            .map(|view| {
                let result = compute_with_scopes(view, graph, config, &scopes);
                if let Err(err) = &result {
                    warn!(view = %view.id, code = err.code(), error = %err, "view computation failed");
                }
                (view.id.clone(), result)
            })
            .collect();
        debug!(
            views = results.len(),
            failed = results.iter().filter(|(_, r)| r.is_err()).count(),
            "catalog computed"
        );
        results
    }
}
