//! # Pooled dispatcher - fire-and-forget fan-out to a worker pool.
//!
//! [`PooledDispatcher`] wraps a [`HandlerRegistry`] and a [`WorkerPool`]:
//! `fire` submits one independent unit of work per matching handler and
//! returns without waiting for any of them to start or finish.
//!
//! ## Architecture
//! ```text
//! fire(event)
//!     │  lifecycle gate (fails with Disposed once torn down)
//!     │  snapshot handlers for the event's exact runtime type
//!     │
//!     ├──► pool.submit(handler 1 + event)    failure/panic → logged,
//!     ├──► pool.submit(handler 2 + event)    siblings unaffected
//!     └──► pool.submit(handler N + event)
//!             └─► returns immediately
//! ```
//!
//! ## Rules
//! - **Isolation**: a failing or panicking handler never reaches the
//!   `fire` caller, never cancels sibling units of work, and never kills
//!   a pool worker; failures are logged for diagnostics.
//! - **No cross-handler ordering**: beyond FIFO submission feeding
//!   FIFO-queued workers, nothing is guaranteed, not within one fire and
//!   not across fires. A single-worker pool is the strictly serial case.
//! - **Disposal** is one-way and idempotent; afterwards every operation
//!   except [`Dispatch::clear`] and
//!   [`PooledDispatcher::is_disposed`] fails with
//!   [`DispatchError::Disposed`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::dispatch::lifecycle::Lifecycle;
use crate::dispatch::{Dispatch, PoolConfig};
use crate::error::DispatchError;
use crate::events::{Event, EventType};
use crate::handlers::HandlerRef;
use crate::pool::WorkerPool;
use crate::registry::HandlerRegistry;

/// Dispatcher that executes each handler as an independent unit of work
/// on a worker pool.
///
/// Construction either sizes an owned pool ([`PooledDispatcher::new`],
/// [`PooledDispatcher::with_max_workers`],
/// [`PooledDispatcher::with_config`]) or adopts a caller-supplied one
/// ([`PooledDispatcher::with_pool`]), in which case the
/// `shutdown_on_dispose` flag decides whether disposal tears the pool
/// down or leaves it to its owner.
///
/// Instances are thread safe; all operations take `&self` and can be
/// called from any task or thread.
pub struct PooledDispatcher {
    registry: HandlerRegistry,
    pool: Arc<WorkerPool>,
    shutdown_on_dispose: bool,
    grace: Duration,
    lifecycle: Lifecycle,
}

impl PooledDispatcher {
    /// Creates a dispatcher with the default configuration (16 workers).
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Creates a dispatcher with an owned pool of the given size
    /// (`0` = unbounded).
    #[must_use]
    pub fn with_max_workers(max_workers: usize) -> Self {
        Self::with_config(PoolConfig {
            max_workers,
            ..PoolConfig::default()
        })
    }

    /// Creates a dispatcher from a full configuration.
    #[must_use]
    pub fn with_config(cfg: PoolConfig) -> Self {
        let pool = Arc::new(WorkerPool::with_runtime(cfg.max_workers, cfg.runtime));
        Self {
            registry: HandlerRegistry::new(),
            pool,
            shutdown_on_dispose: true,
            grace: cfg.grace,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Creates a dispatcher over a caller-supplied pool.
    ///
    /// With `shutdown_on_dispose = false` the pool is left untouched by
    /// [`PooledDispatcher::dispose`]; shutting it down is then the
    /// caller's responsibility.
    #[must_use]
    pub fn with_pool(pool: Arc<WorkerPool>, shutdown_on_dispose: bool) -> Self {
        Self {
            registry: HandlerRegistry::new(),
            pool,
            shutdown_on_dispose,
            grace: PoolConfig::default().grace,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Tears the dispatcher down.
    ///
    /// First call: waits out in-flight operations, transitions to
    /// `Disposed` (from here on gated operations fail), shuts the pool
    /// down if it is owned here - gracefully within the configured grace
    /// window, force-cancelling only on timeout - and clears the
    /// registry. Work that `fire` already enqueued drains within the
    /// graceful window.
    ///
    /// Every later call, including concurrent ones, is a clean no-op.
    pub async fn dispose(&self) {
        let Some(_permit) = self.lifecycle.begin_dispose().await else {
            return;
        };

        if self.shutdown_on_dispose {
            self.pool.shutdown(self.grace).await;
        }
        self.registry.clear();
    }

    /// Returns `true` once [`PooledDispatcher::dispose`] has begun.
    ///
    /// Non-blocking; safe to call at any point in the lifecycle.
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.lifecycle.is_disposed()
    }
}

impl Default for PooledDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dispatch for PooledDispatcher {
    fn add_handler<E: Event>(&self, handler: HandlerRef<E>) -> Result<(), DispatchError> {
        let _active = self.lifecycle.guard()?;
        self.registry.add(handler);
        Ok(())
    }

    fn remove_handler<E: Event>(&self, handler: &HandlerRef<E>) -> Result<(), DispatchError> {
        let _active = self.lifecycle.guard()?;
        self.registry.remove(handler);
        Ok(())
    }

    fn handlers_of<E: Event>(&self) -> Result<Option<Vec<HandlerRef<E>>>, DispatchError> {
        let _active = self.lifecycle.guard()?;
        Ok(self.registry.handlers_of::<E>())
    }

    fn supported_event_types(&self) -> Result<HashSet<EventType>, DispatchError> {
        let _active = self.lifecycle.guard()?;
        Ok(self.registry.event_types())
    }

    /// Remains callable after disposal.
    fn clear(&self) {
        self.registry.clear();
    }

    async fn fire_arc<E: Event>(&self, event: Arc<E>) -> Result<(), DispatchError> {
        let _active = self.lifecycle.guard()?;
        let Some(slots) = self.registry.snapshot(EventType::of::<E>()) else {
            return Ok(());
        };

        let event: Arc<dyn Event> = event;
        for slot in slots {
            let event = Arc::clone(&event);
            let accepted = self.pool.submit(async move {
                if let Err(err) = slot.invoke(event).await {
                    tracing::warn!(
                        handler = slot.name(),
                        error = %err,
                        "handler failed"
                    );
                }
            });
            if !accepted {
                // Only reachable when an externally owned pool was shut
                // down underneath us.
                tracing::warn!("worker pool is closed; dropping handler invocation");
            }
        }
        Ok(())
    }
}
