//! # Handler registry - type-keyed handler storage.
//!
//! [`HandlerRegistry`] owns the mapping from an event's exact runtime
//! type to the ordered list of handlers registered for it. Both
//! dispatchers compose a registry; it can also be used on its own.
//!
//! ## Architecture
//! ```text
//! add::<E>(h)        ──► map[EventType::of::<E>()].push(slot(h))
//! remove::<E>(h)     ──► first entry with the same Arc identity is dropped
//! handlers_of::<E>() ──► snapshot copy of the typed list (or None)
//! snapshot(key)      ──► erased slots for the fire path
//! ```
//!
//! ## Rules
//! - **Insertion order is preserved** per event type; duplicates are
//!   allowed and each registration fires.
//! - **Identity removal**: the same `Arc` that was added is the key;
//!   only the first matching entry is removed.
//! - **No compaction**: removing the last handler leaves an empty list
//!   behind. Lookups treat "key absent" and "key present but empty" the
//!   same way, as "nothing to invoke".
//! - **Internally synchronized**: all operations take the registry's own
//!   lock; callers never need external locking and never see the raw map.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::events::{Event, EventType};
use crate::handlers::{ErasedHandler, HandlerRef, HandlerSlot};

/// One registered handler: the erased slot plus its removal identity.
struct Registration {
    ident: usize,
    slot: Arc<dyn ErasedHandler>,
}

type HandlerMap = HashMap<EventType, Vec<Registration>>;

/// Shared, internally synchronized handler storage.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HandlerMap>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for events of type `E`.
    ///
    /// Appends to the type's list, creating it on first use. No
    /// de-duplication: adding the same handler twice makes it run twice
    /// per fire.
    pub fn add<E: Event>(&self, handler: HandlerRef<E>) {
        let registration = Registration {
            ident: ident(&handler),
            slot: Arc::new(HandlerSlot::new(handler)),
        };
        self.write()
            .entry(EventType::of::<E>())
            .or_default()
            .push(registration);
    }

    /// Removes a handler previously registered for events of type `E`.
    ///
    /// A no-op when the type has no list or the handler is not in it;
    /// otherwise the first entry with the same identity is removed.
    pub fn remove<E: Event>(&self, handler: &HandlerRef<E>) {
        let ident = ident(handler);
        let mut map = self.write();
        if let Some(list) = map.get_mut(&EventType::of::<E>())
            && let Some(index) = list.iter().position(|r| r.ident == ident)
        {
            list.remove(index);
        }
    }

    /// Returns a snapshot of the handlers registered for `E`, in
    /// registration order.
    ///
    /// `None` means no handler was ever registered for the type. An
    /// empty `Some` can occur after removals; callers must treat both as
    /// "nothing to invoke". Mutating the returned list never affects the
    /// registry.
    pub fn handlers_of<E: Event>(&self) -> Option<Vec<HandlerRef<E>>> {
        let map = self.read();
        let list = map.get(&EventType::of::<E>())?;
        Some(
            list.iter()
                .filter_map(|r| r.slot.as_any().downcast_ref::<HandlerSlot<E>>())
                .map(HandlerSlot::handler)
                .collect(),
        )
    }

    /// Returns a snapshot of the event types that currently have a
    /// handler list.
    ///
    /// The set is a copy; mutating it never affects the registry. Types
    /// whose lists were emptied by removals still appear until
    /// [`HandlerRegistry::clear`].
    pub fn event_types(&self) -> HashSet<EventType> {
        self.read().keys().copied().collect()
    }

    /// Removes every registration. Safe to call repeatedly.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Erased snapshot of one type's handlers for the fire path.
    pub(crate) fn snapshot(&self, key: EventType) -> Option<Vec<Arc<dyn ErasedHandler>>> {
        let map = self.read();
        let list = map.get(&key)?;
        Some(list.iter().map(|r| Arc::clone(&r.slot)).collect())
    }

    fn read(&self) -> RwLockReadGuard<'_, HandlerMap> {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HandlerMap> {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Removal identity of a handler: the address of its allocation.
fn ident<E: Event>(handler: &HandlerRef<E>) -> usize {
    Arc::as_ptr(handler) as *const () as usize
}
