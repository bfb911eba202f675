//! View contract and lifecycle primitives.
//!
//! A view is the passive side of a binding: it exposes a "ready" lifecycle
//! event and nothing else the runtime cares about. Presenters are wired to
//! a view before its ready event can fire, so a presenter never misses the
//! signal it was bound for.

mod composite;
mod ready;

pub use composite::CompositeView;
pub use ready::ReadyEvent;

use std::any::Any;
use std::sync::Arc;

/// Downcast hooks for runtime-typed values.
///
/// The blanket impl covers every concrete type; trait objects built on top
/// of it dispatch to the concrete impl, so `as_any_ref(..).type_id()`
/// always reports the erased type rather than the trait object itself.
pub trait AsAny {
    fn as_any_ref(&self) -> &dyn Any;
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any_ref(&self) -> &dyn Any {
        self
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Minimal capability a bindable view exposes.
pub trait View: Any + Send + Sync + AsAny {
    /// The view's ready lifecycle event. Fires at most once, when the host
    /// shell declares the view fully initialized.
    fn ready(&self) -> &ReadyEvent;
}

/// Runtime type of the value behind a view handle.
///
/// Goes through the vtable on purpose: calling `type_id` on the `Arc`
/// itself would report the handle type, not the view behind it.
pub(crate) fn view_type_id(view: &Arc<dyn View>) -> std::any::TypeId {
    view.as_ref().as_any_ref().type_id()
}
