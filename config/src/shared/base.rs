use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A pipeline needs at least one transform stage.
    #[error("`workers` cannot be zero")]
    WorkersZero,
    /// Streams need room for at least one in-flight item.
    #[error("`stream_capacity` cannot be zero")]
    StreamCapacityZero,
}
