//! Local publish/subscribe coordinator for cross-presenter messaging.
//!
//! Presenters bound in the same unit of work never hold references to each
//! other; they exchange typed messages through one coordinator instance
//! owned by their binder.
//!
//! The coordinator keeps an append-only log of everything published while
//! it is open. New subscribers replay the matching part of that log before
//! they are registered, so subscription order does not decide who sees
//! which message, only delivery order. Dispatch is synchronous on the
//! publisher's stack; a publish from inside a callback is a nested call,
//! not concurrent execution.

mod message;

pub use message::{BusMessage, Upcast};

use std::any::{Any, TypeId};
use std::error::Error;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

/// Failure surfaced by a subscriber callback.
pub type SubscriberError = Box<dyn Error + Send + Sync>;

type ErasedCallback = Arc<dyn Fn(&dyn BusMessage) -> Result<(), SubscriberError> + Send + Sync>;

/// Errors raised by the message coordinator.
#[derive(Debug, Error)]
pub enum BusError {
    /// Publish or subscribe after `close()`.
    #[error("message coordinator is closed")]
    Closed,

    /// A subscriber callback failed. Dispatch for the offending publish
    /// stopped there; the message itself stays recorded.
    #[error("subscriber failed while handling '{message}': {source}")]
    Subscriber {
        message: &'static str,
        #[source]
        source: SubscriberError,
    },
}

#[derive(Clone)]
struct LogEntry {
    seq: u64,
    message: Arc<dyn BusMessage>,
}

#[derive(Clone)]
struct Subscription {
    message_type: TypeId,
    callback: ErasedCallback,
}

struct CoordinatorState {
    open: bool,
    next_seq: u64,
    log: Vec<LogEntry>,
    subscriptions: Vec<Subscription>,
}

/// The delivery view of `message` for subscribers of `target`, if any.
fn projection<'m>(message: &'m dyn BusMessage, target: TypeId) -> Option<&'m dyn Any> {
    let exact = message.as_any_ref();
    if exact.type_id() == target {
        return Some(exact);
    }
    message
        .upcasts()
        .into_iter()
        .find(|upcast| upcast.type_id == target)
        .map(|upcast| upcast.value)
}

/// Local message bus with append-only log, replay to late subscribers and
/// terminal close.
///
/// State machine: Open → Closed, one transition, via [`close`]. Every
/// `publish`/`subscribe` on a closed coordinator fails fast with
/// [`BusError::Closed`]; `close` itself is idempotent.
pub struct MessageCoordinator {
    id: Uuid,
    state: Mutex<CoordinatorState>,
}

impl MessageCoordinator {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: Mutex::new(CoordinatorState {
                open: true,
                next_seq: 0,
                log: Vec::new(),
                subscriptions: Vec::new(),
            }),
        }
    }

    /// Identifier used in trace output to tell concurrent sessions apart.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().open
    }

    /// Publish `message` to every matching subscriber, in subscription
    /// order, synchronously.
    ///
    /// The message is appended to the log before dispatch, so it stays
    /// recorded even when a subscriber fails. The first callback error
    /// aborts dispatch for this publish and propagates to the caller.
    pub fn publish<M: BusMessage>(&self, message: M) -> Result<(), BusError> {
        self.publish_dyn(Arc::new(message))
    }

    /// Type-erased variant of [`publish`](Self::publish).
    pub fn publish_dyn(&self, message: Arc<dyn BusMessage>) -> Result<(), BusError> {
        let (seq, subscriptions) = {
            let mut state = self.state.lock();
            if !state.open {
                return Err(BusError::Closed);
            }
            let seq = state.next_seq;
            state.next_seq += 1;
            state.log.push(LogEntry {
                seq,
                message: Arc::clone(&message),
            });
            (seq, state.subscriptions.clone())
        };

        tracing::trace!(
            bus = %self.id,
            seq,
            message = message.message_name(),
            "dispatching publish"
        );

        // The lock is released before callbacks run: a callback may
        // publish again (nested, same stack) or subscribe without
        // deadlocking. Subscriptions added mid-dispatch are not on this
        // snapshot; they receive the in-flight message exactly once,
        // through log replay at subscribe time rather than live dispatch.
        for subscription in &subscriptions {
            if projection(message.as_ref(), subscription.message_type).is_some() {
                (subscription.callback)(message.as_ref()).map_err(|source| {
                    BusError::Subscriber {
                        message: message.message_name(),
                        source,
                    }
                })?;
            }
        }
        Ok(())
    }

    /// Register `callback` for messages deliverable as `M`.
    ///
    /// Every already-logged matching message is replayed to the callback
    /// first, in original publish order, before this call returns. A
    /// replay failure propagates and the callback is not registered.
    pub fn subscribe<M, F>(&self, callback: F) -> Result<(), BusError>
    where
        M: BusMessage,
        F: Fn(&M) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        let target = TypeId::of::<M>();
        let erased: ErasedCallback = Arc::new(move |message: &dyn BusMessage| {
            match projection(message, target).and_then(|value| value.downcast_ref::<M>()) {
                Some(typed) => callback(typed),
                // Dispatch pre-filters on type; nothing to do for a miss.
                None => Ok(()),
            }
        });
        self.subscribe_erased(target, erased)
    }

    fn subscribe_erased(
        &self,
        message_type: TypeId,
        callback: ErasedCallback,
    ) -> Result<(), BusError> {
        let replay = {
            let state = self.state.lock();
            if !state.open {
                return Err(BusError::Closed);
            }
            state.log.clone()
        };

        for entry in &replay {
            let message = entry.message.as_ref();
            if projection(message, message_type).is_some() {
                tracing::trace!(
                    bus = %self.id,
                    seq = entry.seq,
                    message = message.message_name(),
                    "replaying to new subscriber"
                );
                callback(message).map_err(|source| BusError::Subscriber {
                    message: message.message_name(),
                    source,
                })?;
            }
        }

        let mut state = self.state.lock();
        // A replay callback may have closed the coordinator; registering
        // on a closed one fails like any other subscribe.
        if !state.open {
            return Err(BusError::Closed);
        }
        state.subscriptions.push(Subscription {
            message_type,
            callback,
        });
        Ok(())
    }

    /// Close the coordinator. Idempotent; the log and all subscriptions
    /// are discarded on the first call.
    pub fn close(&self) {
        let discarded = {
            let mut state = self.state.lock();
            if !state.open {
                return;
            }
            state.open = false;
            (
                std::mem::take(&mut state.log),
                std::mem::take(&mut state.subscriptions),
            )
        };
        tracing::debug!(
            bus = %self.id,
            messages = discarded.0.len(),
            subscribers = discarded.1.len(),
            "coordinator closed"
        );
    }
}

impl Default for MessageCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable endpoint presenters keep after [`Presenter::attach`].
///
/// Same surface and semantics as the coordinator it points at.
///
/// [`Presenter::attach`]: crate::presenter::Presenter::attach
#[derive(Clone)]
pub struct BusHandle {
    coordinator: Arc<MessageCoordinator>,
}

impl BusHandle {
    pub fn new(coordinator: Arc<MessageCoordinator>) -> Self {
        Self { coordinator }
    }

    pub fn publish<M: BusMessage>(&self, message: M) -> Result<(), BusError> {
        self.coordinator.publish(message)
    }

    pub fn subscribe<M, F>(&self, callback: F) -> Result<(), BusError>
    where
        M: BusMessage,
        F: Fn(&M) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        self.coordinator.subscribe(callback)
    }

    pub fn close(&self) {
        self.coordinator.close();
    }

    pub fn is_open(&self) -> bool {
        self.coordinator.is_open()
    }
}
