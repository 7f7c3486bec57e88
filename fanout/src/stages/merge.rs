use std::convert::identity;

use tokio::task::JoinSet;
use tracing::{Instrument, debug, debug_span, error};

use crate::concurrency::cancel::CancelRx;
use crate::concurrency::stream::{DEFAULT_STREAM_CAPACITY, StreamRx, stream};
use crate::stages::forward;

/// Combines every item of every upstream into one stream, in arrival order.
///
/// One forwarding task is spawned per upstream, plus a coordinator that waits for all of them
/// before closing the merged stream. The merged stream is therefore never closed while a
/// forwarder could still write to it. Each forwarder stops when its upstream ends or the
/// cancellation signal fires.
///
/// With no upstreams, the merged stream is closed right away.
///
/// Must be called within a Tokio runtime.
pub fn merge<T, I>(cancel_rx: &CancelRx, upstreams: I) -> StreamRx<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = StreamRx<T>>,
{
    merge_with_capacity(cancel_rx, upstreams, DEFAULT_STREAM_CAPACITY)
}

/// Same as [`merge`] with a merged stream holding up to `capacity` items.
pub fn merge_with_capacity<T, I>(cancel_rx: &CancelRx, upstreams: I, capacity: usize) -> StreamRx<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = StreamRx<T>>,
{
    let (tx, rx) = stream(capacity);
    let mut forwarders = JoinSet::new();

    for upstream in upstreams {
        let cancel_rx = cancel_rx.clone();
        let writer = tx.writer();

        let span = debug_span!("merge_forwarder", upstream = %upstream.id(), downstream = %writer.id());
        forwarders.spawn(
            async move {
                let (exit, forwarded) = forward(cancel_rx, upstream, &writer, identity).await;
                exit.log("merge_forwarder", forwarded);
            }
            .instrument(span),
        );
    }

    let span = debug_span!("merge_coordinator", downstream = %tx.id(), feeders = forwarders.len());
    tokio::spawn(
        async move {
            while let Some(result) = forwarders.join_next().await {
                if let Err(err) = result {
                    error!(error = %err, "merge forwarder task failed");
                }
            }

            // Every forwarder has returned, so nothing can write into the stream anymore.
            tx.close();
            debug!("merge stage terminated");
        }
        .instrument(span),
    );

    rx
}
