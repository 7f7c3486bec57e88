//! Cancellable fan-out/fan-in pipelines on top of Tokio.
//!
//! A pipeline run has three kinds of stages:
//!
//! - a **source** turning a sequence of values into a stream ([`stages::produce`], [`stages::generate`]),
//! - any number of **transform** stages sharing that stream, each item going to exactly one of them
//!   ([`stages::transform`], [`stages::fan_out`]),
//! - a **merge** stage combining the transform outputs into one stream ([`stages::merge`]).
//!
//! Every stage observes the same cancellation signal ([`concurrency::cancel`]). Activating it makes
//! every stage blocked on a read or a write stop at once and close the stream it owns.
//!
//! ```rust,no_run
//! use fanout::concurrency::cancel::create_cancel_channel;
//! use fanout::stages::{fan_out, merge, produce};
//!
//! # async fn example() {
//! let (cancel_tx, cancel_rx) = create_cancel_channel();
//!
//! let source = produce(vec![2, 3]);
//! let squares = merge(&cancel_rx, fan_out(&cancel_rx, &source, 2, |n: i64| n * n));
//!
//! while let Some(square) = squares.recv().await {
//!     println!("{square}");
//! }
//!
//! cancel_tx.cancel();
//! # }
//! ```

pub mod concurrency;
pub mod error;
pub mod pipeline;
pub mod stages;
