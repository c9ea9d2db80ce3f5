//! # Handler contract and the closure-backed adapter.
//!
//! [`Handler`] is the extension point for reacting to events of one
//! concrete type. A handler is registered against a dispatcher (any
//! number of times; every registration fires) and invoked with a shared
//! reference-counted copy of the event.
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching, retries); under the
//!   pooled dispatcher they do **not** block the publisher nor sibling
//!   handlers, under the synchronous dispatcher they run inline.
//! - Failure is reported by returning [`HandlerError`], never by
//!   panicking; pooled workers catch panics anyway and log them.
//! - Removal is by identity: the same `Arc` that was added is the key
//!   that removes it.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::Event;

/// Shared handle to a registered handler.
pub type HandlerRef<E> = Arc<dyn Handler<E>>;

/// Callback executed when an event of type `E` is fired.
///
/// Called either inline (synchronous dispatcher) or from a pool worker
/// task (pooled dispatcher). Implementations should avoid blocking the
/// async runtime; prefer async I/O and cooperative waits.
#[async_trait]
pub trait Handler<E: Event>: Send + Sync + 'static {
    /// Handles a single event.
    ///
    /// The event arrives as an `Arc` because one fired value may be
    /// processed by many handlers concurrently.
    async fn handle(&self, event: Arc<E>) -> Result<(), HandlerError>;

    /// Returns the handler name used in logs and failure diagnostics.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose -
    /// override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Function-backed handler implementation.
///
/// Wraps a closure that *creates* a new future per invocation, so no
/// shared mutable state is needed. If shared state is wanted, capture an
/// `Arc<...>` explicitly inside the closure.
#[derive(Debug)]
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a
    /// [`HandlerRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    ///
    /// ## Example
    /// ```rust
    /// use std::sync::Arc;
    /// use eventor::{HandlerError, HandlerFn, HandlerRef, SimpleEvent};
    ///
    /// let h: HandlerRef<SimpleEvent> = HandlerFn::arc("audit", |_event: Arc<SimpleEvent>| async {
    ///     Ok::<_, HandlerError>(())
    /// });
    /// assert_eq!(h.name(), "audit");
    /// ```
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<E, F, Fut> Handler<E> for HandlerFn<F>
where
    E: Event,
    F: Fn(Arc<E>) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, event: Arc<E>) -> Result<(), HandlerError> {
        (self.f)(event).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
