//! # Core event contract and type identity.
//!
//! An [`Event`] is an immutable occurrence of interest with a single
//! semantic attribute: the opaque `source` it originated from. Concrete
//! event kinds are told apart by their runtime type, captured as an
//! [`EventType`] key.
//!
//! ## Rules
//! - Dispatch is **exact-type**: an event value only reaches handlers
//!   registered for its own concrete type, never for a related type.
//! - Events cross worker-task boundaries, so `Send + Sync` is part of the
//!   contract; `Any` is what makes the type key derivable.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

/// An occurrence of interest during the normal execution of a program.
///
/// Each event carries a source, which is typically the place the event
/// originated. Implementations are plain immutable value types; the
/// dispatch machinery only ever reads them.
pub trait Event: Any + Send + Sync {
    /// Returns the opaque source of this event.
    fn source(&self) -> &(dyn Any + Send + Sync);
}

/// Lookup key for a concrete event type.
///
/// Wraps the runtime [`TypeId`] together with the type name for logs.
/// Equality and hashing consider only the id, so two keys captured for
/// the same concrete type always match regardless of where they were
/// created.
///
/// ## Example
/// ```rust
/// use eventor::{EventType, SimpleEvent, ValueChangedEvent};
///
/// let a = EventType::of::<SimpleEvent>();
/// let b = EventType::of::<SimpleEvent>();
/// assert_eq!(a, b);
///
/// // Different value parameters are different event types.
/// assert_ne!(
///     EventType::of::<ValueChangedEvent<u32>>(),
///     EventType::of::<ValueChangedEvent<i64>>(),
/// );
/// ```
#[derive(Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
}

impl EventType {
    /// Captures the key for the concrete event type `E`.
    #[must_use]
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: type_name::<E>(),
        }
    }

    /// Returns the type name this key was captured with.
    ///
    /// Intended for logs and diagnostics; the name is not part of the
    /// key's identity.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventType").field(&self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SimpleEvent;
    use std::collections::HashSet;

    #[test]
    fn test_same_type_same_key() {
        let a = EventType::of::<SimpleEvent>();
        let b = EventType::of::<SimpleEvent>();
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b), "hash must follow equality");
    }

    #[test]
    fn test_name_is_captured() {
        let key = EventType::of::<SimpleEvent>();
        assert!(
            key.name().ends_with("SimpleEvent"),
            "unexpected name: {}",
            key.name()
        );
    }
}
