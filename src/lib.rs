//! Presenter resolution and binding runtime for view/presenter
//! architectures.
//!
//! The crate wires three layers together:
//!
//! - a [`registry::TypeRegistry`] describing the bindable view and
//!   presenter types, with declarative bindings and capability markers,
//! - discovery strategies ([`discovery`]) that resolve a view type to its
//!   presenters, either from declarations or by naming conventions backed
//!   by a memoizing [`cache::TypeResolutionCache`],
//! - a [`binder::PresenterBinder`] that walks hosts for views, constructs
//!   presenters through the [`instantiator`], and connects everything to a
//!   per-session [`bus::MessageCoordinator`] for loosely coupled
//!   cross-presenter messaging.

pub mod binder;
pub mod bus;
pub mod cache;
pub mod config;
pub mod discovery;
pub mod instantiator;
pub mod presenter;
pub mod registry;
pub mod view;

pub use binder::{BinderError, Host, PresenterBinder, PresenterBinderBuilder, PresenterCreated};
pub use bus::{BusError, BusHandle, BusMessage, MessageCoordinator, Upcast};
pub use cache::TypeResolutionCache;
pub use config::{ConfigError, ConventionConfig};
pub use discovery::{
    BindingDeclaration, BindingMode, BindingOrigin, CompositeDiscovery, DiscoveryError,
    DiscoveryStrategy, ViewBinding,
};
pub use instantiator::{InstantiationError, PresenterInstantiator, SharedPresenter};
pub use presenter::{BindsView, Presenter, PresenterError};
pub use registry::{PresenterEntry, TypeRegistry, ViewDescriptor};
pub use view::{CompositeView, ReadyEvent, View};
