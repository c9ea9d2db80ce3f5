//! # Synchronous dispatcher - handlers run on the caller's context.
//!
//! [`SyncDispatcher`] invokes every matching handler inline, in
//! registration order, awaiting each one before starting the next.
//! `fire` does not return until every handler has run or one has failed.
//!
//! ## Rules
//! - **Registration order** is invocation order.
//! - **Fail-fast**: the first handler failure propagates to the `fire`
//!   caller and the remaining handlers are not invoked.
//! - Firing an event type with no registrations is a successful no-op.
//! - No disposal lifecycle: the dispatcher holds no background
//!   resources, dropping it is enough.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::dispatch::Dispatch;
use crate::error::DispatchError;
use crate::events::{Event, EventType};
use crate::handlers::HandlerRef;
use crate::registry::HandlerRegistry;

/// Dispatcher that executes handlers inline.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use eventor::{Dispatch, HandlerError, HandlerFn, SimpleEvent, SyncDispatcher};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dispatcher = SyncDispatcher::new();
/// dispatcher.add_handler::<SimpleEvent>(HandlerFn::arc(
///     "greeter",
///     |_event: Arc<SimpleEvent>| async { Ok::<_, HandlerError>(()) },
/// ))?;
///
/// // Runs the handler before returning.
/// dispatcher.fire(SimpleEvent::new("main")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SyncDispatcher {
    registry: HandlerRegistry,
}

impl SyncDispatcher {
    /// Creates an empty dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Dispatch for SyncDispatcher {
    fn add_handler<E: Event>(&self, handler: HandlerRef<E>) -> Result<(), DispatchError> {
        self.registry.add(handler);
        Ok(())
    }

    fn remove_handler<E: Event>(&self, handler: &HandlerRef<E>) -> Result<(), DispatchError> {
        self.registry.remove(handler);
        Ok(())
    }

    fn handlers_of<E: Event>(&self) -> Result<Option<Vec<HandlerRef<E>>>, DispatchError> {
        Ok(self.registry.handlers_of::<E>())
    }

    fn supported_event_types(&self) -> Result<HashSet<EventType>, DispatchError> {
        Ok(self.registry.event_types())
    }

    fn clear(&self) {
        self.registry.clear();
    }

    async fn fire_arc<E: Event>(&self, event: Arc<E>) -> Result<(), DispatchError> {
        let Some(slots) = self.registry.snapshot(EventType::of::<E>()) else {
            return Ok(());
        };

        let event: Arc<dyn Event> = event;
        for slot in slots {
            slot.invoke(Arc::clone(&event)).await?;
        }
        Ok(())
    }
}
