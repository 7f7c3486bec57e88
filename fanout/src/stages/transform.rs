use tracing::{Instrument, debug, debug_span};

use crate::concurrency::cancel::CancelRx;
use crate::concurrency::stream::{DEFAULT_STREAM_CAPACITY, StreamRx, stream};
use crate::stages::forward;

/// Spawns a stage applying `f` to every item of `upstream`.
///
/// Calling this several times on clones of the same upstream fans it out: the stages race for
/// items and each item is processed by exactly one of them. Within one stage, output order
/// follows input order.
///
/// The returned stream is closed once the upstream ends, the cancellation signal fires, every
/// reader of the returned stream is dropped or `f` panics. A fallible `f` should return a
/// `Result` so failures travel downstream as items instead of stopping the stage.
///
/// Must be called within a Tokio runtime.
pub fn transform<T, U, F>(cancel_rx: &CancelRx, upstream: StreamRx<T>, f: F) -> StreamRx<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> U + Send + 'static,
{
    transform_with_capacity(cancel_rx, upstream, f, DEFAULT_STREAM_CAPACITY)
}

/// Same as [`transform`] with a downstream stream holding up to `capacity` items.
pub fn transform_with_capacity<T, U, F>(
    cancel_rx: &CancelRx,
    upstream: StreamRx<T>,
    f: F,
    capacity: usize,
) -> StreamRx<U>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> U + Send + 'static,
{
    let (tx, rx) = stream(capacity);
    let cancel_rx = cancel_rx.clone();

    let span = debug_span!("transform_stage", upstream = %upstream.id(), downstream = %tx.id());
    tokio::spawn(
        async move {
            debug!("transform stage started");

            let (exit, forwarded) = forward(cancel_rx, upstream, tx.as_writer(), f).await;

            tx.close();
            exit.log("transform", forwarded);
        }
        .instrument(span),
    );

    rx
}

/// Attaches `workers` transform stages to `upstream` and returns their outputs.
pub fn fan_out<T, U, F>(
    cancel_rx: &CancelRx,
    upstream: &StreamRx<T>,
    workers: usize,
    f: F,
) -> Vec<StreamRx<U>>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> U + Clone + Send + 'static,
{
    fan_out_with_capacity(cancel_rx, upstream, workers, f, DEFAULT_STREAM_CAPACITY)
}

/// Same as [`fan_out`] with output streams holding up to `capacity` items each.
pub fn fan_out_with_capacity<T, U, F>(
    cancel_rx: &CancelRx,
    upstream: &StreamRx<T>,
    workers: usize,
    f: F,
    capacity: usize,
) -> Vec<StreamRx<U>>
where
    T: Send + 'static,
    U: Send + 'static,
    F: Fn(T) -> U + Clone + Send + 'static,
{
    (0..workers)
        .map(|_| transform_with_capacity(cancel_rx, upstream.clone(), f.clone(), capacity))
        .collect()
}
