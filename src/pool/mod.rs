//! Background execution for the pooled dispatcher.
//!
//! [`WorkerPool`] is the explicit worker abstraction: unbounded
//! spawn-per-submission, a single strictly serial worker, or N workers
//! over one FIFO backlog, with graceful-then-forced shutdown.

mod pool;

pub use pool::WorkerPool;
