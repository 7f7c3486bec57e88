//! Shared configuration types for fan-out pipelines.

mod base;
mod pipeline;

pub use base::ValidationError;
pub use pipeline::PipelineConfig;
