#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

use fanout::concurrency::stream::StreamRx;
use tokio::time::{sleep, timeout};

/// Upper bound for any single wait in these tests.
///
/// A pipeline that hangs fails the test with a clear message instead of blocking the suite.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Awaits `future`, panicking if it does not complete within [`TEST_TIMEOUT`].
pub async fn within_timeout<F: Future>(what: &str, future: F) -> F::Output {
    match timeout(TEST_TIMEOUT, future).await {
        Ok(output) => output,
        Err(_) => panic!(
            "timed out after {TEST_TIMEOUT:?} waiting for {what}. \
             Some stage is likely blocked and never observed cancellation."
        ),
    }
}

/// Receives every remaining item of `rx`.
pub async fn drain<T>(rx: &StreamRx<T>) -> Vec<T> {
    within_timeout("stream to close", async {
        let mut items = Vec::new();
        while let Some(item) = rx.recv().await {
            items.push(item);
        }
        items
    })
    .await
}

/// Waits until the owner of `rx` has closed it, without reading from it.
pub async fn wait_for_close<T>(rx: &StreamRx<T>) {
    within_timeout("stream owner to close its stream", async {
        while rx.close_count() == 0 {
            sleep(Duration::from_millis(1)).await;
        }
    })
    .await;

    assert_eq!(rx.close_count(), 1, "stream {} closed more than once", rx.id());
}

pub fn square(n: i64) -> i64 {
    n * n
}

pub fn sorted<T: Ord>(mut items: Vec<T>) -> Vec<T> {
    items.sort_unstable();
    items
}
