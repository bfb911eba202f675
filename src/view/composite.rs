//! Aggregation of view fragments behind one logical view.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{ReadyEvent, View};

/// Several physical view fragments presented to the binder as one logical
/// view. Used for shared bindings, where distinct view instances must agree
/// on a single presenter.
///
/// The composite's ready event fires once every fragment has signalled
/// ready, so a presenter bound to the composite never observes a partially
/// initialized group.
pub struct CompositeView {
    fragments: Vec<Arc<dyn View>>,
    ready: ReadyEvent,
}

impl CompositeView {
    pub fn new(fragments: Vec<Arc<dyn View>>) -> Arc<Self> {
        let composite = Arc::new(Self {
            fragments,
            ready: ReadyEvent::new(),
        });

        let pending = Arc::new(AtomicUsize::new(composite.fragments.len()));
        if composite.fragments.is_empty() {
            composite.ready.notify();
            return composite;
        }

        for fragment in &composite.fragments {
            let pending = Arc::clone(&pending);
            let weak = Arc::downgrade(&composite);
            // Fragments that are already ready decrement immediately via
            // the late-observer path of ReadyEvent.
            fragment.ready().observe(move || {
                if pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                    if let Some(composite) = weak.upgrade() {
                        composite.ready.notify();
                    }
                }
            });
        }

        composite
    }

    /// The physical views behind this composite, in aggregation order.
    pub fn fragments(&self) -> &[Arc<dyn View>] {
        &self.fragments
    }
}

impl View for CompositeView {
    fn ready(&self) -> &ReadyEvent {
        &self.ready
    }
}
