//! Cached presenter construction.
//!
//! The binding decision requires type introspection, but binding itself
//! must stay amortized O(1): the instantiator synthesizes one constructor
//! invoker per (presenter type, view type) pair and memoizes it, so repeat
//! binds of the same pair skip the introspective work entirely.

use std::any::TypeId;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::cache::TypeResolutionCache;
use crate::presenter::{Presenter, PresenterError};
use crate::registry::PresenterEntry;
use crate::view::{view_type_id, View};

/// A live presenter, shared between the binder that owns its lifecycle and
/// the lifecycle callbacks wired to its view.
pub type SharedPresenter = Arc<Mutex<dyn Presenter>>;

/// Specialized constructor: view in, presenter out.
pub type Invoker =
    Arc<dyn Fn(Arc<dyn View>) -> Result<SharedPresenter, InstantiationError> + Send + Sync>;

/// Presenter construction failures. Propagated unchanged, never retried.
#[derive(Debug, Error)]
pub enum InstantiationError {
    /// The offered view is not the type the presenter binds.
    #[error("presenter '{presenter}' cannot bind this view; expects '{expected}'")]
    ViewMismatch {
        presenter: &'static str,
        expected: &'static str,
    },

    /// The presenter's own constructor failed.
    #[error("constructor of '{presenter}' failed: {source}")]
    Constructor {
        presenter: &'static str,
        #[source]
        source: PresenterError,
    },
}

/// Memoized invoker factory.
///
/// Safe to share across concurrent binding sessions: racing first access
/// for the same pair may synthesize twice, but all callers end up with
/// interchangeable invokers and later binds hit the cache.
pub struct PresenterInstantiator {
    invokers: TypeResolutionCache<(TypeId, TypeId), Invoker>,
}

impl PresenterInstantiator {
    pub fn new() -> Self {
        Self {
            invokers: TypeResolutionCache::new(),
        }
    }

    /// The cached invoker for (`entry`, `view_type`), synthesized on first
    /// use.
    pub fn invoker(&self, entry: &Arc<PresenterEntry>, view_type: TypeId) -> Invoker {
        self.invokers
            .get_or_compute((entry.type_id(), view_type), || {
                tracing::debug!(
                    presenter = entry.type_name(),
                    "synthesizing constructor invoker"
                );
                entry.synthesize_invoker()
            })
    }

    /// Construct a presenter from `entry` for `view`.
    pub fn instantiate(
        &self,
        entry: &Arc<PresenterEntry>,
        view: Arc<dyn View>,
    ) -> Result<SharedPresenter, InstantiationError> {
        let invoker = self.invoker(entry, view_type_id(&view));
        invoker(view)
    }

    /// Number of synthesized invokers, for diagnostics.
    pub fn cached_invokers(&self) -> usize {
        self.invokers.len()
    }
}

impl Default for PresenterInstantiator {
    fn default() -> Self {
        Self::new()
    }
}
