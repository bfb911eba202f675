//! One-shot "ready" lifecycle event.

use parking_lot::Mutex;

type Handler = Box<dyn Fn() + Send + Sync>;

struct ReadyState {
    fired: bool,
    handlers: Vec<Handler>,
}

/// Observe-then-notify lifecycle signal.
///
/// `notify` fires registered handlers in registration order, at most once.
/// Observing after the event has fired runs the handler immediately, so a
/// late-wired observer (a dynamically added fragment, for instance) still
/// sees the signal.
pub struct ReadyEvent {
    state: Mutex<ReadyState>,
}

impl ReadyEvent {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ReadyState {
                fired: false,
                handlers: Vec::new(),
            }),
        }
    }

    /// Register a handler. Runs immediately if the event already fired.
    pub fn observe<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        let handler: Handler = Box::new(handler);
        let run_now = {
            let mut state = self.state.lock();
            if state.fired {
                Some(handler)
            } else {
                state.handlers.push(handler);
                None
            }
        };
        if let Some(handler) = run_now {
            handler();
        }
    }

    /// Fire the event. Handlers run on the caller's stack, in registration
    /// order. Subsequent calls are no-ops.
    pub fn notify(&self) {
        let handlers = {
            let mut state = self.state.lock();
            if state.fired {
                return;
            }
            state.fired = true;
            std::mem::take(&mut state.handlers)
        };
        // Lock released before user code runs: a handler may observe this
        // event or tear the owner down without deadlocking.
        for handler in &handlers {
            handler();
        }
    }

    pub fn has_fired(&self) -> bool {
        self.state.lock().fired
    }
}

impl Default for ReadyEvent {
    fn default() -> Self {
        Self::new()
    }
}
