//! Two-state disposal lifecycle for the pooled dispatcher.
//!
//! `Active` → `Disposed`, one-way. Gated operations hold a shared guard
//! for their whole critical section; flipping to `Disposed` takes the
//! gate exclusively, so an operation either completed fully against the
//! live pool or observes `Disposed` - never a pool that has already
//! begun shutdown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use crate::error::DispatchError;

/// Guard held by a gated operation while it runs against the live pool.
///
/// Disposal cannot begin while any of these are alive.
pub(crate) struct ActiveGuard<'a> {
    _gate: RwLockReadGuard<'a, ()>,
}

/// Disposal state machine.
pub(crate) struct Lifecycle {
    gate: RwLock<()>,
    disposed: AtomicBool,
    // Serializes overlapping dispose() calls across the whole teardown
    // sequence, not just the flag flip.
    teardown: tokio::sync::Mutex<()>,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            gate: RwLock::new(()),
            disposed: AtomicBool::new(false),
            teardown: tokio::sync::Mutex::new(()),
        }
    }

    /// Admits a gated operation, or fails with `Disposed`.
    pub(crate) fn guard(&self) -> Result<ActiveGuard<'_>, DispatchError> {
        let gate = self.gate.read().unwrap_or_else(PoisonError::into_inner);
        if self.disposed.load(Ordering::Acquire) {
            return Err(DispatchError::Disposed);
        }
        Ok(ActiveGuard { _gate: gate })
    }

    /// Non-blocking read of the current state.
    #[inline]
    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Starts the one-way transition to `Disposed`.
    ///
    /// Returns `None` when the dispatcher is already disposed (the call
    /// is a no-op). Otherwise waits out in-flight gated operations,
    /// flips the state, and returns a permit the caller holds for the
    /// rest of the teardown sequence; concurrent `dispose` calls block
    /// on the permit and then observe `Disposed`.
    pub(crate) async fn begin_dispose(&self) -> Option<tokio::sync::MutexGuard<'_, ()>> {
        let permit = self.teardown.lock().await;
        if self.disposed.load(Ordering::Acquire) {
            return None;
        }
        {
            let _exclusive = self.gate.write().unwrap_or_else(PoisonError::into_inner);
            self.disposed.store(true, Ordering::Release);
        }
        Some(permit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_active() {
        let lifecycle = Lifecycle::new();
        assert!(!lifecycle.is_disposed());
        assert!(lifecycle.guard().is_ok());
    }

    #[tokio::test]
    async fn test_one_way_transition() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.begin_dispose().await.is_some());
        assert!(lifecycle.is_disposed());
        assert!(matches!(
            lifecycle.guard(),
            Err(DispatchError::Disposed)
        ));
    }

    #[tokio::test]
    async fn test_second_dispose_is_noop() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.begin_dispose().await.is_some());
        assert!(lifecycle.begin_dispose().await.is_none());
        assert!(lifecycle.begin_dispose().await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_dispose_single_winner() {
        use std::sync::Arc;

        let lifecycle = Arc::new(Lifecycle::new());
        let mut tasks = Vec::new();
        for _ in 0..8 {
            let lifecycle = Arc::clone(&lifecycle);
            tasks.push(tokio::spawn(async move {
                lifecycle.begin_dispose().await.is_some()
            }));
        }

        let mut winners = 0;
        for task in tasks {
            if task.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1, "exactly one caller performs the teardown");
    }
}
