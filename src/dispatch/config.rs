//! # Pooled dispatcher configuration.
//!
//! Provides [`PoolConfig`] settings consumed by
//! [`PooledDispatcher::with_config`](crate::PooledDispatcher::with_config).
//!
//! ## Sentinel values
//! - `max_workers = 0` → unbounded (fresh task per unit of work)
//! - `grace = 0s` → no graceful window, force-cancel immediately

use std::time::Duration;

use tokio::runtime::Handle;

/// Settings for a [`PooledDispatcher`](crate::PooledDispatcher) and the
/// worker pool it owns.
///
/// ## Field semantics
/// - `max_workers`: pool shape (`0` = unbounded, `1` = strictly serial,
///   `N` = fixed set with an unbounded FIFO backlog)
/// - `grace`: how long disposal lets queued and running work drain
///   before force-cancelling
/// - `runtime`: where worker tasks spawn (`None` = the ambient runtime)
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Maximum number of concurrent workers.
    ///
    /// - `0` = unlimited: every submission gets its own task, nothing
    ///   queues
    /// - `1` = one worker: units of work run strictly serially in
    ///   submission order
    /// - `n > 1` = `n` workers over one unbounded FIFO backlog; once all
    ///   are busy, submissions queue instead of blocking the caller
    pub max_workers: usize,

    /// Maximum time disposal waits for in-flight and queued work before
    /// force-cancelling.
    ///
    /// `Duration::ZERO` skips the graceful window entirely.
    pub grace: Duration,

    /// Runtime handle worker tasks spawn on.
    ///
    /// `None` uses the runtime current at construction. Workers are
    /// ordinary tasks either way and never keep the process alive.
    pub runtime: Option<Handle>,
}

impl Default for PoolConfig {
    /// Default configuration:
    ///
    /// - `max_workers = 16` (bounded baseline)
    /// - `grace = 5s` (drain window before disposal forces)
    /// - `runtime = None` (ambient runtime)
    fn default() -> Self {
        Self {
            max_workers: 16,
            grace: Duration::from_secs(5),
            runtime: None,
        }
    }
}
