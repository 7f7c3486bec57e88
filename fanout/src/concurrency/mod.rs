//! Concurrency primitives shared by all pipeline stages.
//!
//! - [`cancel`] is the broadcast stop signal. It transitions once, every stage observes it, and a
//!   stage blocked on a stream read or write wakes up as soon as it fires.
//! - [`stream`] is the conduit between stages: one owning writer that closes it exactly once, any
//!   number of readers sharing a single read position.

pub mod cancel;
pub mod stream;
