//! Presenter contract.
//!
//! A presenter holds a one-way dependency on its view: it reacts to the
//! view's lifecycle and mutates the view's model, never the other way
//! around. Presenters talk to each other exclusively through the message
//! coordinator handle they receive at attach time.

use std::any::Any;
use std::error::Error;
use std::sync::Arc;

use crate::bus::BusHandle;
use crate::view::View;

/// Boxed failure a presenter may surface during teardown.
pub type PresenterError = Box<dyn Error + Send + Sync>;

/// Mutable downcast hook, blanket-implemented for every concrete type so
/// host shells can inject context through [`Presenter::as_any_mut`].
pub trait AsAnyMut {
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAnyMut for T {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Mediator bound to exactly one (possibly composite) view.
///
/// Lifecycle, driven by the binder:
/// 1. construction via [`BindsView::create`];
/// 2. [`attach`](Presenter::attach) with the session bus handle; this is
///    the place for bus subscriptions and other bind-time wiring, and it
///    completes before the view's ready event can reach the presenter;
/// 3. [`on_view_ready`](Presenter::on_view_ready) when the bound view
///    signals ready;
/// 4. [`release`](Presenter::release) on binder teardown.
pub trait Presenter: AsAnyMut + Any + Send {
    /// Bind-time wiring. Called exactly once, immediately after
    /// construction.
    fn attach(&mut self, bus: BusHandle);

    /// The bound view signalled ready.
    fn on_view_ready(&mut self) {}

    /// Teardown. Errors abort the binder's remaining cleanup.
    fn release(&mut self) -> Result<(), PresenterError> {
        Ok(())
    }
}

impl std::fmt::Debug for dyn Presenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Presenter")
    }
}

/// Constructor seam between a presenter type and the view type it accepts.
///
/// Registration captures this impl and erases it into the cached invoker
/// the instantiator hands out, so construction cost is paid per
/// (presenter, view) pair rather than per bind.
pub trait BindsView: Presenter + Sized {
    type View: View;

    /// Construct the presenter for `view`. Failures propagate to the bind
    /// pass unchanged; the runtime never retries.
    fn create(view: Arc<Self::View>) -> Result<Self, PresenterError>;
}
