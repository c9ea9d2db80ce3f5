//! Handler contract, closure adapter, and type-erased storage.
//!
//! ## Contents
//! - [`Handler`], [`HandlerRef`] the typed callback contract and its
//!   shared-handle alias
//! - [`HandlerFn`] closure-backed handler for quick registrations
//! - `erased` (crate-private) the storage slot the registry keeps and the
//!   single narrowing-cast boundary

mod erased;
mod handler;

pub use handler::{Handler, HandlerFn, HandlerRef};

pub(crate) use erased::{ErasedHandler, HandlerSlot};
