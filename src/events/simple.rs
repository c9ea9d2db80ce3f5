//! Minimal source-only event.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::events::Event;

/// A plain event that carries nothing but its source.
///
/// Sufficient for most "something happened over there" notifications
/// where the event type itself is the whole message.
///
/// ## Example
/// ```rust
/// use eventor::{Event, SimpleEvent};
///
/// let event = SimpleEvent::new("uploader");
/// assert_eq!(event.source().downcast_ref::<&str>(), Some(&"uploader"));
/// ```
#[derive(Clone)]
pub struct SimpleEvent {
    source: Arc<dyn Any + Send + Sync>,
}

impl SimpleEvent {
    /// Creates a new event with the given source.
    pub fn new(source: impl Any + Send + Sync) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Creates a new event from an already shared source.
    ///
    /// Useful when many events originate from the same long-lived object.
    pub fn from_source(source: Arc<dyn Any + Send + Sync>) -> Self {
        Self { source }
    }
}

impl Event for SimpleEvent {
    fn source(&self) -> &(dyn Any + Send + Sync) {
        self.source.as_ref()
    }
}

impl fmt::Debug for SimpleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleEvent").finish_non_exhaustive()
    }
}
