//! Runtime-typed message payloads.

use std::any::{Any, TypeId};

use crate::view::AsAny;

/// A widening a message supports beyond its exact runtime type.
///
/// Rust models "derived" messages by composition: a message that embeds a
/// base message can offer the embedded value under the base's [`TypeId`],
/// and subscribers registered for the base type then receive it.
pub struct Upcast<'a> {
    pub type_id: TypeId,
    pub value: &'a dyn Any,
}

impl<'a> Upcast<'a> {
    /// Offer `value` under its own type id.
    pub fn as_type<B: Any>(value: &'a B) -> Self {
        Self {
            type_id: TypeId::of::<B>(),
            value,
        }
    }
}

/// Payload carried on the message coordinator.
///
/// Implementing the trait is all a type needs; `upcasts` is only for
/// messages that also want delivery under a less specific type. The
/// opposite direction never holds: a subscriber for a specific type does
/// not receive messages logged under a broader one.
pub trait BusMessage: AsAny + Any + Send + Sync {
    /// Additional types this message may be delivered as.
    fn upcasts(&self) -> Vec<Upcast<'_>> {
        Vec::new()
    }

    /// Diagnostic name; defaults to the concrete type's path.
    fn message_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
