use tracing::{Instrument, debug, debug_span};

use crate::concurrency::cancel::CancelRx;
use crate::concurrency::stream::{DEFAULT_STREAM_CAPACITY, StreamRx, stream};
use crate::stages::StageExit;

/// Turns a finite sequence into a closed stream holding every value, in order.
///
/// The stream is sized to hold the whole sequence, so values are written synchronously and no
/// task is spawned. An empty sequence yields a stream that is already closed.
pub fn produce<T, I>(values: I) -> StreamRx<T>
where
    I: IntoIterator<Item = T>,
{
    let values: Vec<T> = values.into_iter().collect();
    let len = values.len();
    let (tx, rx) = stream(len);

    for value in values {
        if tx.try_send(value).is_err() {
            // Unreachable while `rx` is held and the buffer is sized to `len`.
            unreachable!("source stream sized for {len} values rejected a write");
        }
    }

    debug!(stream_id = %tx.id(), len, "source stream produced");
    tx.close();

    rx
}

/// Spawns a task writing `values` one at a time into a single-slot stream.
///
/// Unlike [`produce`], the sequence may be unbounded: the task stops once the sequence ends, the
/// cancellation signal fires or every reader is dropped, then closes the stream.
///
/// Must be called within a Tokio runtime.
pub fn generate<T, I>(cancel_rx: &CancelRx, values: I) -> StreamRx<T>
where
    T: Send + 'static,
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
{
    let (tx, rx) = stream(DEFAULT_STREAM_CAPACITY);
    let mut cancel_rx = cancel_rx.clone();
    let mut values = values.into_iter();

    let span = debug_span!("source_stage", downstream = %tx.id());
    tokio::spawn(
        async move {
            let mut emitted = 0;

            let exit = loop {
                let Some(value) = values.next() else {
                    break StageExit::Exhausted;
                };

                tokio::select! {
                    biased;

                    _ = cancel_rx.cancelled() => break StageExit::Cancelled,

                    result = tx.send(value) => {
                        if result.is_err() {
                            break StageExit::Abandoned;
                        }
                    }
                }

                emitted += 1;
            };

            tx.close();
            exit.log("source", emitted);
        }
        .instrument(span),
    );

    rx
}
