//! # Change-notification events.
//!
//! [`ValueChangedEvent`] signals that a value of interest moved from one
//! state to another; [`ProgressChangedEvent`] is the progress-reporting
//! variant constrained to the `0.0..=1.0` range.
//!
//! Neither type checks that the previous and current value differ; equal
//! values are accepted as-is.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::events::Event;

/// Event signalling that a value of interest has changed.
///
/// The value parameter is part of the event's identity: handlers
/// registered for `ValueChangedEvent<u32>` never observe a
/// `ValueChangedEvent<String>`.
#[derive(Clone)]
pub struct ValueChangedEvent<T: Send + Sync + 'static> {
    source: Arc<dyn Any + Send + Sync>,
    previous: T,
    current: T,
}

impl<T: Send + Sync + 'static> ValueChangedEvent<T> {
    /// Creates a new change event with the given source and value pair.
    pub fn new(source: impl Any + Send + Sync, previous: T, current: T) -> Self {
        Self {
            source: Arc::new(source),
            previous,
            current,
        }
    }

    /// Returns the value before the change.
    #[inline]
    pub fn previous(&self) -> &T {
        &self.previous
    }

    /// Returns the value after the change.
    #[inline]
    pub fn current(&self) -> &T {
        &self.current
    }
}

impl<T: Send + Sync + 'static> Event for ValueChangedEvent<T> {
    fn source(&self) -> &(dyn Any + Send + Sync) {
        self.source.as_ref()
    }
}

impl<T: fmt::Debug + Send + Sync + 'static> fmt::Debug for ValueChangedEvent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueChangedEvent")
            .field("previous", &self.previous)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

/// A progress value fell outside `0.0..=1.0`.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("progress must be within 0.0..=1.0, got {value}")]
pub struct ProgressOutOfRange {
    /// The rejected value.
    pub value: f32,
}

/// Event indicating that the progress of some task has changed.
///
/// Progress values are fractions in `0.0..=1.0`; construction rejects
/// anything outside that range. [`ProgressChangedEvent::previous_percentage`]
/// and [`ProgressChangedEvent::current_percentage`] render the pair for
/// display.
///
/// ## Example
/// ```rust
/// use eventor::ProgressChangedEvent;
///
/// let event = ProgressChangedEvent::new("downloader", 0.1, 0.25).unwrap();
/// assert_eq!(event.current_percentage(), "25.00%");
/// assert!(ProgressChangedEvent::new("downloader", 0.1, 1.5).is_err());
/// ```
#[derive(Clone)]
pub struct ProgressChangedEvent {
    source: Arc<dyn Any + Send + Sync>,
    previous: f32,
    current: f32,
}

impl ProgressChangedEvent {
    /// Creates a new progress event with the given source and value pair.
    ///
    /// Fails with [`ProgressOutOfRange`] if either value is outside
    /// `0.0..=1.0`.
    pub fn new(
        source: impl Any + Send + Sync,
        previous: f32,
        current: f32,
    ) -> Result<Self, ProgressOutOfRange> {
        Ok(Self {
            source: Arc::new(source),
            previous: valid_progress(previous)?,
            current: valid_progress(current)?,
        })
    }

    /// Returns the progress before the change.
    #[inline]
    pub fn previous(&self) -> f32 {
        self.previous
    }

    /// Returns the progress after the change.
    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Returns the previous progress rendered as a percentage.
    pub fn previous_percentage(&self) -> String {
        to_percentage(self.previous)
    }

    /// Returns the current progress rendered as a percentage.
    pub fn current_percentage(&self) -> String {
        to_percentage(self.current)
    }
}

impl Event for ProgressChangedEvent {
    fn source(&self) -> &(dyn Any + Send + Sync) {
        self.source.as_ref()
    }
}

impl fmt::Debug for ProgressChangedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressChangedEvent")
            .field("previous", &self.previous)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ProgressChangedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[progress: {} => {}]",
            self.previous_percentage(),
            self.current_percentage()
        )
    }
}

fn to_percentage(value: f32) -> String {
    format!("{:.2}%", value * 100.0)
}

fn valid_progress(value: f32) -> Result<f32, ProgressOutOfRange> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ProgressOutOfRange { value })
    }
}
