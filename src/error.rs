//! Error types used by the dispatchers and by handler code.
//!
//! This module defines two main error enums:
//!
//! - [`DispatchError`] - errors raised by the dispatch machinery itself.
//! - [`HandlerError`] - failures raised by individual handler executions.
//!
//! Both types provide `as_label` helpers for logging and metrics. No
//! error here is fatal to the process and none is retried automatically;
//! every failure is scoped to the call or unit of work that produced it.

use thiserror::Error;

/// # Errors produced by dispatcher operations.
///
/// `Disposed` is raised synchronously by every gated operation on a
/// pooled dispatcher after [`dispose`](crate::PooledDispatcher::dispose)
/// has begun; the dispatcher is permanently unusable from that point.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Operation attempted on a dispatcher that has been torn down.
    #[error("dispatcher is disposed")]
    Disposed,

    /// A handler failed during a synchronous fire.
    ///
    /// Only the synchronous dispatcher surfaces handler failures to the
    /// caller; the pooled dispatcher confines them to the failing unit
    /// of work.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use eventor::DispatchError;
    ///
    /// assert_eq!(DispatchError::Disposed.as_label(), "dispatch_disposed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Disposed => "dispatch_disposed",
            DispatchError::Handler(_) => "dispatch_handler_failed",
        }
    }
}

/// # Failures raised by handler code.
///
/// Handlers report failure by returning this type from
/// [`Handler::handle`](crate::Handler::handle). How a failure travels
/// depends on the dispatcher: synchronous dispatch propagates it to the
/// `fire` caller and stops the remaining handlers; pooled dispatch logs
/// it and carries on with sibling units of work.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Handler execution failed.
    #[error("handler failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl HandlerError {
    /// Creates a failure from any displayable error message.
    ///
    /// # Example
    /// ```
    /// use eventor::HandlerError;
    ///
    /// let err = HandlerError::fail("connection refused");
    /// assert_eq!(err.to_string(), "handler failed: connection refused");
    /// ```
    pub fn fail(error: impl Into<String>) -> Self {
        HandlerError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Fail { .. } => "handler_failed",
        }
    }

    /// Returns a human-readable message with details about the failure.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Fail { error } => format!("error: {error}"),
        }
    }
}
