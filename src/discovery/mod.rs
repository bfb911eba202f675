//! Binding discovery: deciding which presenters a view should receive.
//!
//! Two sources feed a bind pass: declarative metadata attached to the view
//! type at registration, and naming conventions probed against the type
//! registry. A binder composes them as an ordered list of strategies whose
//! results are unioned, deliberately without deduplication, since a view
//! may legitimately receive more than one presenter.

mod convention;
mod declared;

pub use convention::{ConventionResolver, ConventionStrategy};
pub use declared::DeclaredBindingStrategy;

use std::any::TypeId;
use std::sync::Arc;

use thiserror::Error;

use crate::config::ConventionConfig;
use crate::presenter::Presenter;
use crate::registry::{PresenterEntry, TypeRegistry};
use crate::view::View;

/// Invalid declarative binding metadata. Raised at resolution time, before
/// any presenter is instantiated.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A shared binding must name its view type explicitly: several
    /// distinct view instances have to agree on one sharing key, so
    /// defaulting it silently would be wrong.
    #[error("shared binding declared on '{view}' must name an explicit view type")]
    SharedBindingWithoutView { view: String },

    #[error("binding declared on '{declared_on}' names unregistered presenter '{presenter}'")]
    UnknownPresenter {
        presenter: &'static str,
        declared_on: String,
    },
}

/// How a binding maps view instances to presenter instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingMode {
    /// One presenter per view instance.
    PerView,
    /// One presenter for all instances of the declared view type,
    /// aggregated behind a composite view.
    SharedAcrossViews,
}

/// Which strategy produced a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingOrigin {
    Declared,
    Convention,
}

/// Declarative binding attached to a view type at registration, the
/// equivalent of a binding attribute in metadata-driven hosts.
#[derive(Debug, Clone)]
pub struct BindingDeclaration {
    presenter: TypeId,
    presenter_name: &'static str,
    view: Option<TypeId>,
    mode: BindingMode,
}

impl BindingDeclaration {
    /// Declare a binding to presenter type `P`, per-view by default.
    pub fn to<P: Presenter>() -> Self {
        Self {
            presenter: TypeId::of::<P>(),
            presenter_name: std::any::type_name::<P>(),
            view: None,
            mode: BindingMode::PerView,
        }
    }

    /// Name the view type explicitly instead of inheriting the declaring
    /// type. Mandatory for shared bindings.
    pub fn for_view<V: View>(mut self) -> Self {
        self.view = Some(TypeId::of::<V>());
        self
    }

    /// Share one presenter across all instances of the declared view type.
    pub fn shared(mut self) -> Self {
        self.mode = BindingMode::SharedAcrossViews;
        self
    }

    pub fn presenter(&self) -> TypeId {
        self.presenter
    }

    pub fn presenter_name(&self) -> &'static str {
        self.presenter_name
    }

    pub fn view(&self) -> Option<TypeId> {
        self.view
    }

    pub fn mode(&self) -> BindingMode {
        self.mode
    }
}

/// A resolved association between a view type and a presenter type.
#[derive(Clone)]
pub struct ViewBinding {
    pub view_type: TypeId,
    pub presenter: Arc<PresenterEntry>,
    pub mode: BindingMode,
    pub origin: BindingOrigin,
}

/// One source of bindings for a view type.
pub trait DiscoveryStrategy: Send + Sync {
    fn resolve(
        &self,
        view_type: TypeId,
        registry: &TypeRegistry,
    ) -> Result<Vec<ViewBinding>, DiscoveryError>;
}

/// Ordered union of discovery strategies.
///
/// Cloneable so independent binding sessions can share one composition,
/// and with it the convention resolver's memo cache.
#[derive(Clone)]
pub struct CompositeDiscovery {
    strategies: Vec<Arc<dyn DiscoveryStrategy>>,
}

impl CompositeDiscovery {
    pub fn new(strategies: Vec<Arc<dyn DiscoveryStrategy>>) -> Self {
        Self { strategies }
    }

    /// The default composition: declared bindings first, then convention
    /// discovery.
    pub fn standard(config: ConventionConfig) -> Self {
        Self::new(vec![
            Arc::new(DeclaredBindingStrategy::new()),
            Arc::new(ConventionStrategy::new(config)),
        ])
    }

    /// Union of every strategy's bindings, in strategy order. No
    /// deduplication and no override between strategies.
    pub fn resolve(
        &self,
        view_type: TypeId,
        registry: &TypeRegistry,
    ) -> Result<Vec<ViewBinding>, DiscoveryError> {
        let mut bindings = Vec::new();
        for strategy in &self.strategies {
            bindings.extend(strategy.resolve(view_type, registry)?);
        }
        Ok(bindings)
    }
}

impl DiscoveryStrategy for CompositeDiscovery {
    fn resolve(
        &self,
        view_type: TypeId,
        registry: &TypeRegistry,
    ) -> Result<Vec<ViewBinding>, DiscoveryError> {
        CompositeDiscovery::resolve(self, view_type, registry)
    }
}
