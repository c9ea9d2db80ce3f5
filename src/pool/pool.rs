//! # Worker pool for fire-and-forget handler execution.
//!
//! [`WorkerPool`] runs submitted units of work on background tasks. Three
//! shapes, selected by `max_workers`:
//!
//! ```text
//! max_workers = 0   submit ──► fresh task per unit of work (no queue)
//!
//! max_workers = 1   submit ──► [FIFO queue] ──► worker ──► unit of work
//!                               (unbounded)       └─ strictly serial
//!
//! max_workers = N   submit ──► [FIFO queue] ──► worker 1..N ──► units of work
//!                               (unbounded)       └─ N at a time, backlog queues
//! ```
//!
//! ## Rules
//! - `submit` never blocks: unbounded mode spawns, fixed mode enqueues.
//! - **Panic isolation**: every unit of work runs under `catch_unwind`;
//!   a panic is logged and the worker moves on to the next unit.
//! - **Shutdown** is graceful first: intake closes, queued and running
//!   work drains within a grace window; only when the window elapses are
//!   outstanding tasks cancelled, and cancellation is best-effort - a
//!   future stops at its next await point, non-cooperative work is not
//!   interrupted.
//! - Workers are plain runtime tasks; they never keep the process alive.
//!
//! ## Panic handling
//! `AssertUnwindSafe` is used to run units of work under `catch_unwind`,
//! which can leave shared state inconsistent if a handler panics while
//! holding a lock it shares with others.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Pool of background execution tasks with FIFO submission order.
///
/// Created either internally by
/// [`PooledDispatcher`](crate::PooledDispatcher) or directly, to be
/// shared across dispatchers via `Arc`.
///
/// ### Notes
/// - Fixed-size pools spawn their workers at construction, so a Tokio
///   runtime must be current unless a [`Handle`] is supplied.
/// - A pool that has been [`shutdown`](WorkerPool::shutdown) rejects
///   further submissions; it cannot be reopened.
pub struct WorkerPool {
    max_workers: usize,
    queue: Mutex<Option<mpsc::UnboundedSender<Job>>>,
    open: AtomicBool,
    tracker: TaskTracker,
    cancel: CancellationToken,
    runtime: Option<Handle>,
}

impl WorkerPool {
    /// Creates a pool with the given worker count (`0` = unbounded) on
    /// the current runtime.
    #[must_use]
    pub fn new(max_workers: usize) -> Self {
        Self::with_runtime(max_workers, None)
    }

    /// Creates a pool whose tasks spawn on the given runtime handle
    /// (`None` = the ambient runtime).
    #[must_use]
    pub fn with_runtime(max_workers: usize, runtime: Option<Handle>) -> Self {
        let pool = Self {
            max_workers,
            queue: Mutex::new(None),
            open: AtomicBool::new(true),
            tracker: TaskTracker::new(),
            cancel: CancellationToken::new(),
            runtime,
        };

        if max_workers > 0 {
            let (tx, rx) = mpsc::unbounded_channel::<Job>();
            let rx = Arc::new(tokio::sync::Mutex::new(rx));
            for index in 0..max_workers {
                pool.spawn(worker_loop(index, Arc::clone(&rx), pool.cancel.clone()));
            }
            *pool.intake() = Some(tx);
        }
        pool
    }

    /// Returns the configured worker count (`0` = unbounded).
    #[inline]
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Returns `true` once the pool no longer accepts work.
    #[inline]
    pub fn is_closed(&self) -> bool {
        !self.open.load(Ordering::Acquire)
    }

    /// Submits one unit of work.
    ///
    /// Non-blocking in every mode: unbounded pools spawn a fresh task,
    /// fixed pools enqueue onto the shared FIFO backlog. Returns `false`
    /// when the pool has been shut down and the work was not accepted.
    pub fn submit<F>(&self, job: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_closed() {
            return false;
        }

        if self.max_workers == 0 {
            let cancel = self.cancel.clone();
            self.spawn(async move {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {}
                    result = std::panic::AssertUnwindSafe(job).catch_unwind() => {
                        if let Err(panic) = result {
                            tracing::error!(panic = %panic_message(panic.as_ref()), "unit of work panicked");
                        }
                    }
                }
            });
            return true;
        }

        match self.intake().as_ref() {
            Some(tx) => tx.send(Box::pin(job)).is_ok(),
            None => false,
        }
    }

    /// Shuts the pool down.
    ///
    /// 1. Closes intake; later submissions are rejected.
    /// 2. Lets queued and running work drain for up to `grace`
    ///    (`Duration::ZERO` = no wait, cancel immediately).
    /// 3. On timeout, cancels outstanding tasks (best-effort) and
    ///    returns `false`.
    ///
    /// Returns `true` when everything drained within the window. Safe to
    /// call repeatedly; later calls return `true` once the pool is
    /// drained.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.open.store(false, Ordering::Release);
        // Dropping the sender ends the worker loops once the backlog is
        // drained.
        drop(self.intake().take());
        self.tracker.close();

        match tokio::time::timeout(grace, self.tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    grace_ms = grace.as_millis() as u64,
                    "grace window elapsed; cancelling outstanding units of work"
                );
                self.cancel.cancel();
                false
            }
        }
    }

    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match &self.runtime {
            Some(handle) => {
                self.tracker.spawn_on(fut, handle);
            }
            None => {
                self.tracker.spawn(fut);
            }
        }
    }

    fn intake(&self) -> std::sync::MutexGuard<'_, Option<mpsc::UnboundedSender<Job>>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Drains the shared backlog until the queue closes or the pool is
/// force-cancelled.
async fn worker_loop(
    index: usize,
    rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<Job>>>,
    cancel: CancellationToken,
) {
    tracing::trace!(worker = index, "worker started");
    loop {
        let job = {
            let mut rx = rx.lock().await;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                job = rx.recv() => match job {
                    Some(job) => job,
                    None => break,
                },
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = std::panic::AssertUnwindSafe(job).catch_unwind() => {
                if let Err(panic) = result {
                    tracing::error!(
                        worker = index,
                        panic = %panic_message(panic.as_ref()),
                        "unit of work panicked"
                    );
                }
            }
        }
    }
    tracing::trace!(worker = index, "worker stopped");
}

/// Extracts a printable message from a caught panic payload.
fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
