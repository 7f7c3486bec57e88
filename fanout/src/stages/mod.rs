//! Pipeline stages: sources, transforms and merges.
//!
//! Every stage owns exactly one downstream [`StreamTx`](crate::concurrency::stream::StreamTx) and
//! closes it on every exit path. Stages that read from upstream race each read and each write
//! against the cancellation signal, so a stage blocked on either stops as soon as the signal fires.

mod exit;
mod merge;
mod source;
mod transform;

use std::panic::{self, AssertUnwindSafe};

use crate::concurrency::cancel::CancelRx;
use crate::concurrency::stream::{StreamRx, StreamWriter};

pub(crate) use exit::StageExit;
pub use merge::{merge, merge_with_capacity};
pub use source::{generate, produce};
pub use transform::{fan_out, fan_out_with_capacity, transform, transform_with_capacity};

/// Reads from `upstream`, applies `f` and writes into `downstream` until the upstream ends, the
/// signal fires, every downstream reader is gone or `f` panics.
///
/// Returns how the loop ended and how many items were written.
async fn forward<T, U, F>(
    mut cancel_rx: CancelRx,
    upstream: StreamRx<T>,
    downstream: &StreamWriter<U>,
    mut f: F,
) -> (StageExit, u64)
where
    F: FnMut(T) -> U,
{
    let mut forwarded = 0;

    let exit = loop {
        let item = tokio::select! {
            biased;

            _ = cancel_rx.cancelled() => break StageExit::Cancelled,

            item = upstream.recv() => match item {
                Some(item) => item,
                None => break StageExit::Exhausted,
            },
        };

        let Ok(output) = panic::catch_unwind(AssertUnwindSafe(|| f(item))) else {
            break StageExit::Panicked;
        };

        tokio::select! {
            biased;

            _ = cancel_rx.cancelled() => break StageExit::Cancelled,

            result = downstream.send(output) => {
                if result.is_err() {
                    break StageExit::Abandoned;
                }
            }
        }

        forwarded += 1;
    };

    (exit, forwarded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concurrency::cancel::create_cancel_channel;
    use crate::concurrency::stream::stream;
    use std::convert::identity;
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    const WAIT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn closed_upstream_exhausts() {
        let (_cancel_tx, cancel_rx) = create_cancel_channel();
        let (tx, rx) = stream(4);

        let result =
            forward(cancel_rx, produce(vec![1, 2, 3]), tx.as_writer(), |n: i32| n + 1).await;
        tx.close();

        assert_eq!(result, (StageExit::Exhausted, 3));
        for expected in [2, 3, 4] {
            assert_eq!(rx.recv().await, Some(expected));
        }
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn active_signal_wins_over_ready_items() {
        let (cancel_tx, cancel_rx) = create_cancel_channel();
        let (tx, rx) = stream::<i32>(4);
        cancel_tx.cancel();

        let result = forward(cancel_rx, produce(vec![1, 2]), tx.as_writer(), identity).await;

        tx.close();

        assert_eq!(result, (StageExit::Cancelled, 0));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn cancellation_while_writing_reports_forwarded_items() {
        let (cancel_tx, cancel_rx) = create_cancel_channel();
        let (tx, rx) = stream(1);

        let stage = tokio::spawn(async move {
            forward(cancel_rx, produce(vec![1, 2, 3]), tx.as_writer(), identity).await
        });

        // The first item fills the only slot and the second write blocks.
        sleep(Duration::from_millis(10)).await;
        cancel_tx.cancel();

        let result = timeout(WAIT, stage).await.unwrap().unwrap();
        assert_eq!(result, (StageExit::Cancelled, 1));
        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn dropped_readers_abandon() {
        let (_cancel_tx, cancel_rx) = create_cancel_channel();
        let (tx, rx) = stream::<i32>(1);
        drop(rx);

        let result = forward(cancel_rx, produce(vec![1, 2]), tx.as_writer(), identity).await;

        assert_eq!(result, (StageExit::Abandoned, 0));
    }

    #[tokio::test]
    async fn panicking_function_stops_after_forwarded_items() {
        let (_cancel_tx, cancel_rx) = create_cancel_channel();
        let (tx, rx) = stream(4);

        let result =
            forward(cancel_rx, produce(vec![1, 0, 2]), tx.as_writer(), |n: i32| 12 / n).await;
        tx.close();

        assert_eq!(result, (StageExit::Panicked, 1));
        assert_eq!(rx.recv().await, Some(12));
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn exits_display_as_log_values() {
        let names: Vec<_> = [
            StageExit::Exhausted,
            StageExit::Cancelled,
            StageExit::Abandoned,
            StageExit::Panicked,
        ]
        .iter()
        .map(StageExit::to_string)
        .collect();

        assert_eq!(names, ["exhausted", "cancelled", "abandoned", "panicked"]);
    }
}
