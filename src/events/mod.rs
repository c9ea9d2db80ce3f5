//! Event data model: the core contract and the bundled event values.
//!
//! ## Contents
//! - [`Event`], [`EventType`] the contract every event implements and the
//!   exact-runtime-type key dispatch is performed against
//! - [`SimpleEvent`] source-only event
//! - [`ValueChangedEvent`], [`ProgressChangedEvent`] change notifications
//!
//! The dispatchers treat event values as opaque: they read the type key,
//! nothing else. Custom event types only need to implement [`Event`].

mod event;
mod simple;
mod value;

pub use event::{Event, EventType};
pub use simple::SimpleEvent;
pub use value::{ProgressChangedEvent, ProgressOutOfRange, ValueChangedEvent};
