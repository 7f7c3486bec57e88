//! Telemetry setup shared by fan-out binaries and tests.

pub mod tracing;
