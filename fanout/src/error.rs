//! Error types for pipeline construction and stream writes.
//!
//! Cancellation is not an error: a cancelled stage closes its stream and the consumer simply sees
//! the stream end. The only failures surfaced here are an invalid configuration and writes into a
//! stream nobody reads anymore.

use config::shared::ValidationError;
use thiserror::Error;

/// Convenient result type for pipeline construction.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors raised while setting up a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration asks for zero workers or zero stream capacity.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(#[from] ValidationError),
}

/// A send failed because every reader of the stream was dropped.
///
/// Carries the item that could not be delivered.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("stream has no remaining readers")]
pub struct SendError<T>(pub T);

/// A non-blocking send failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrySendError<T> {
    /// The stream buffer is full; the item was not written.
    #[error("stream is full")]
    Full(T),
    /// Every reader of the stream was dropped.
    #[error("stream has no remaining readers")]
    Closed(T),
}

impl<T> TrySendError<T> {
    /// Returns the item that could not be written.
    pub fn into_inner(self) -> T {
        match self {
            TrySendError::Full(item) | TrySendError::Closed(item) => item,
        }
    }
}
