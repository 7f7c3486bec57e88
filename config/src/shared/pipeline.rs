use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

/// Configuration for a fan-out/fan-in pipeline.
///
/// The number of transform stages is fixed for the lifetime of a pipeline run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Number of transform stages reading from the shared source stream.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Capacity of the streams between transform stages and the merge stage.
    ///
    /// A capacity of one gives a single-slot handoff: a writer only proceeds once
    /// its previous item was taken by a reader.
    #[serde(default = "default_stream_capacity")]
    pub stream_capacity: usize,
}

impl PipelineConfig {
    /// Default number of transform stages.
    pub const DEFAULT_WORKERS: usize = 2;

    /// Default capacity of inter-stage streams.
    pub const DEFAULT_STREAM_CAPACITY: usize = 1;

    /// Validates pipeline configuration settings.
    ///
    /// Ensures both the worker count and the stream capacity are non-zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.workers == 0 {
            return Err(ValidationError::WorkersZero);
        }

        if self.stream_capacity == 0 {
            return Err(ValidationError::StreamCapacityZero);
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            stream_capacity: default_stream_capacity(),
        }
    }
}

fn default_workers() -> usize {
    PipelineConfig::DEFAULT_WORKERS
}

fn default_stream_capacity() -> usize {
    PipelineConfig::DEFAULT_STREAM_CAPACITY
}
