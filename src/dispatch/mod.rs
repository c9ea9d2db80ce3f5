//! Dispatchers: the shared operation surface and its two implementations.
//!
//! ## Contents
//! - [`Dispatch`] the operation set both dispatchers expose
//! - [`SyncDispatcher`] runs handlers inline on the caller's context
//! - [`PooledDispatcher`] hands each handler to a [`WorkerPool`] and has
//!   an explicit disposal lifecycle
//! - [`PoolConfig`] sizing and shutdown settings for the pooled variant
//!
//! Internal modules:
//! - `lifecycle`: the two-state disposal controller gating the pooled
//!   dispatcher's operations.
//!
//! [`WorkerPool`]: crate::WorkerPool

mod config;
mod lifecycle;
mod pooled;
mod sync;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DispatchError;
use crate::events::{Event, EventType};
use crate::handlers::HandlerRef;

pub use config::PoolConfig;
pub use pooled::PooledDispatcher;
pub use sync::SyncDispatcher;

/// Operations shared by both dispatcher variants.
///
/// The synchronous dispatcher never actually fails these; the pooled
/// dispatcher rejects everything except [`Dispatch::clear`] with
/// [`DispatchError::Disposed`] once torn down. `dispose`/`is_disposed`
/// are inherent to [`PooledDispatcher`], the only variant with a
/// lifecycle.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Registers a handler for events of type `E`.
    fn add_handler<E: Event>(&self, handler: HandlerRef<E>) -> Result<(), DispatchError>;

    /// Removes a previously registered handler; a no-op when the type or
    /// the handler is unknown.
    fn remove_handler<E: Event>(&self, handler: &HandlerRef<E>) -> Result<(), DispatchError>;

    /// Returns a snapshot of the handlers registered for `E`, in
    /// registration order, or `None` when the type was never registered.
    fn handlers_of<E: Event>(&self) -> Result<Option<Vec<HandlerRef<E>>>, DispatchError>;

    /// Returns a snapshot of the event types that currently have a
    /// handler list.
    fn supported_event_types(&self) -> Result<HashSet<EventType>, DispatchError>;

    /// Removes every registration. Never fails, also after disposal.
    fn clear(&self);

    /// Fires a pre-shared event to every handler registered for its
    /// exact runtime type.
    ///
    /// Preferred over [`Dispatch::fire`] when the caller already holds
    /// an `Arc`.
    async fn fire_arc<E: Event>(&self, event: Arc<E>) -> Result<(), DispatchError>;

    /// Fires an event to every handler registered for its exact runtime
    /// type. Firing a type with no handlers is a successful no-op.
    async fn fire<E: Event>(&self, event: E) -> Result<(), DispatchError> {
        self.fire_arc(Arc::new(event)).await
    }
}
