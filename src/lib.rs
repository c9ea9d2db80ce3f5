//! # eventor
//!
//! **Eventor** is a typed event-dispatch library for Rust.
//!
//! Handlers register interest in one concrete event type on a shared
//! registry; firing an event invokes every handler currently registered
//! for the event's exact runtime type. Two execution strategies cover
//! the common cases: run handlers inline, or hand each one to a worker
//! pool and return immediately.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!            add_handler::<E>(h)   remove_handler::<E>(h)
//!                     │                  │
//!                     ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  HandlerRegistry                                              │
//! │  - EventType (exact runtime type) ──► ordered handler list    │
//! │  - internally synchronized, snapshot lookups                  │
//! └───────────────┬───────────────────────────────┬───────────────┘
//!                 │                               │
//!        SyncDispatcher                   PooledDispatcher
//!                 │                               │
//!  fire(event).await                  fire(event)  (returns at once)
//!        │                                        │
//!        ▼                                        ▼
//!  handler 1 ─► handler 2 ─► ...        ┌── WorkerPool ─────────────┐
//!  (in order, caller's context,         │ submit per handler:       │
//!   first failure stops the rest)       │  0 = task per unit        │
//!                                       │  1 = one serial worker    │
//!                                       │  N = N workers + backlog  │
//!                                       │ failures/panics logged,   │
//!                                       │ siblings unaffected       │
//!                                       └───────────┬───────────────┘
//!                                                   │
//!                                        dispose(): drain within
//!                                        grace, then force-cancel
//! ```
//!
//! ### Dispatch rules
//! - **Exact-type**: an event only reaches handlers registered for its
//!   own concrete type; there is no subtype widening.
//! - **Registration order** is preserved per type; duplicates are
//!   allowed and each registration fires.
//! - **Best effort**: no delivery guarantee, no ordering across pooled
//!   handlers, no exactly-once execution.
//!
//! ## Features
//! | Area             | Description                                                   | Key types / traits                     |
//! |------------------|---------------------------------------------------------------|----------------------------------------|
//! | **Events**       | Type-keyed immutable values with an opaque source.            | [`Event`], [`EventType`]               |
//! | **Handlers**     | Async callbacks registered per event type, closures included. | [`Handler`], [`HandlerRef`], [`HandlerFn`] |
//! | **Registry**     | Ordered, internally synchronized handler storage.             | [`HandlerRegistry`]                    |
//! | **Dispatch**     | Inline or pooled execution behind one operation set.          | [`Dispatch`], [`SyncDispatcher`], [`PooledDispatcher`] |
//! | **Pooling**      | Unbounded / serial / fixed-size background execution.         | [`WorkerPool`], [`PoolConfig`]         |
//! | **Errors**       | Typed errors for dispatch operations and handler failures.    | [`DispatchError`], [`HandlerError`]    |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventor::{Dispatch, Event, HandlerError, HandlerFn, PooledDispatcher, SimpleEvent};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dispatcher = PooledDispatcher::new();
//!
//!     // Register a closure-backed handler for one event type.
//!     dispatcher.add_handler::<SimpleEvent>(HandlerFn::arc(
//!         "audit",
//!         |event: Arc<SimpleEvent>| async move {
//!             let _who = event.source().downcast_ref::<&str>();
//!             Ok::<_, HandlerError>(())
//!         },
//!     ))?;
//!
//!     // Fire-and-forget: returns before the handler runs.
//!     dispatcher.fire(SimpleEvent::new("uploader")).await?;
//!
//!     // Tear down: drains in-flight work, then the dispatcher is
//!     // permanently unusable.
//!     dispatcher.dispose().await;
//!     assert!(dispatcher.is_disposed());
//!     Ok(())
//! }
//! ```

mod dispatch;
mod error;
mod events;
mod handlers;
mod pool;
mod registry;

// ---- Public re-exports ----

pub use dispatch::{Dispatch, PoolConfig, PooledDispatcher, SyncDispatcher};
pub use error::{DispatchError, HandlerError};
pub use events::{
    Event, EventType, ProgressChangedEvent, ProgressOutOfRange, SimpleEvent, ValueChangedEvent,
};
pub use handlers::{Handler, HandlerFn, HandlerRef};
pub use pool::WorkerPool;
pub use registry::HandlerRegistry;
