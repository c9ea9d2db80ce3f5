//! Type-erased handler storage.
//!
//! The registry keys handlers by [`EventType`](crate::EventType) but has
//! to store them in one map, so each typed handler is wrapped in a
//! [`HandlerSlot`] behind the object-safe [`ErasedHandler`] trait. The
//! narrowing cast back from `Arc<dyn Event>` to the concrete event type
//! happens in exactly one place, [`downcast_event`].

use std::any::Any;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};

use crate::error::HandlerError;
use crate::events::Event;
use crate::handlers::HandlerRef;

/// Object-safe view of a registered handler.
pub(crate) trait ErasedHandler: Send + Sync {
    /// Invokes the handler with an event that must match its registered
    /// type.
    fn invoke(&self, event: Arc<dyn Event>) -> BoxFuture<'static, Result<(), HandlerError>>;

    /// Recovers the typed slot for lookups.
    fn as_any(&self) -> &dyn Any;

    /// Handler name for logs and failure diagnostics.
    fn name(&self) -> &str;
}

/// Typed storage slot for one registration.
pub(crate) struct HandlerSlot<E: Event> {
    handler: HandlerRef<E>,
}

impl<E: Event> HandlerSlot<E> {
    pub(crate) fn new(handler: HandlerRef<E>) -> Self {
        Self { handler }
    }

    /// Returns a fresh shared handle to the underlying typed handler.
    pub(crate) fn handler(&self) -> HandlerRef<E> {
        Arc::clone(&self.handler)
    }
}

impl<E: Event> ErasedHandler for HandlerSlot<E> {
    fn invoke(&self, event: Arc<dyn Event>) -> BoxFuture<'static, Result<(), HandlerError>> {
        match downcast_event::<E>(event) {
            Some(event) => {
                let handler = Arc::clone(&self.handler);
                async move { handler.handle(event).await }.boxed()
            }
            // Unreachable through the registry: slots are stored under the
            // key of their own event type.
            None => future::ready(Err(HandlerError::fail(format!(
                "event type does not match registration of handler {}",
                self.handler.name()
            ))))
            .boxed(),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &str {
        self.handler.name()
    }
}

/// Narrows an erased event back to its concrete type.
///
/// This is the only narrowing cast in the crate; everything above it
/// works with typed values and everything below it with `Arc<dyn Event>`.
pub(crate) fn downcast_event<E: Event>(event: Arc<dyn Event>) -> Option<Arc<E>> {
    let any: Arc<dyn Any + Send + Sync> = event;
    any.downcast::<E>().ok()
}
