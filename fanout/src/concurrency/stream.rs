//! Closable, multi-reader streams connecting pipeline stages.
//!
//! A stream has exactly one [`StreamTx`]. It is not `Clone`, and closing consumes it or happens
//! when it is dropped, so a stream is closed at most once and always closed when its owning stage
//! ends, unwinding included. Readers ([`StreamRx`]) can be cloned freely: clones share one read
//! position and each item is delivered to exactly one of them.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use futures::Stream;
use tokio::sync::{Mutex, mpsc};
use tracing::debug;

use crate::error::{SendError, TrySendError};

/// Capacity of streams between stages unless configured otherwise.
///
/// One slot gives a direct handoff: a writer can only get one item ahead of its readers.
pub const DEFAULT_STREAM_CAPACITY: usize = 1;

static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a stream, used in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(u64);

impl StreamId {
    fn next() -> Self {
        Self(NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stream-{}", self.0)
    }
}

#[derive(Debug)]
struct StreamState {
    id: StreamId,
    closes: AtomicUsize,
}

/// Creates a stream holding up to `capacity` unread items.
///
/// A `capacity` of zero is raised to one.
pub fn stream<T>(capacity: usize) -> (StreamTx<T>, StreamRx<T>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let state = Arc::new(StreamState {
        id: StreamId::next(),
        closes: AtomicUsize::new(0),
    });

    let tx = StreamTx {
        writer: StreamWriter {
            tx,
            state: state.clone(),
        },
    };
    let rx = StreamRx {
        rx: Arc::new(Mutex::new(rx)),
        state,
    };

    (tx, rx)
}

/// Send-only handle on a stream that cannot close it.
///
/// Handed to merge forwarders, which write concurrently into the stream owned by the merge
/// coordinator. The coordinator joins every forwarder before closing.
#[derive(Debug)]
pub(crate) struct StreamWriter<T> {
    tx: mpsc::Sender<T>,
    state: Arc<StreamState>,
}

impl<T> StreamWriter<T> {
    pub(crate) fn id(&self) -> StreamId {
        self.state.id
    }

    /// Waits for a free slot and writes `item`.
    ///
    /// Cancel safe: if the future is dropped before completing, `item` was not written.
    pub(crate) async fn send(&self, item: T) -> Result<(), SendError<T>> {
        self.tx.send(item).await.map_err(|err| SendError(err.0))
    }
}

impl<T> Clone for StreamWriter<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            state: self.state.clone(),
        }
    }
}

/// The single owning writer of a stream.
#[derive(Debug)]
pub struct StreamTx<T> {
    writer: StreamWriter<T>,
}

impl<T> StreamTx<T> {
    /// Returns the identifier of the stream.
    pub fn id(&self) -> StreamId {
        self.writer.id()
    }

    /// Waits for a free slot and writes `item`.
    ///
    /// Fails only when every reader has been dropped.
    pub async fn send(&self, item: T) -> Result<(), SendError<T>> {
        self.writer.send(item).await
    }

    /// Writes `item` if a slot is free, without waiting.
    pub fn try_send(&self, item: T) -> Result<(), TrySendError<T>> {
        self.writer.tx.try_send(item).map_err(|err| match err {
            mpsc::error::TrySendError::Full(item) => TrySendError::Full(item),
            mpsc::error::TrySendError::Closed(item) => TrySendError::Closed(item),
        })
    }

    /// Returns `true` once every reader has been dropped.
    pub fn is_closed(&self) -> bool {
        self.writer.tx.is_closed()
    }

    /// Closes the stream.
    ///
    /// Readers receive every item already written, then see the end of the stream.
    pub fn close(self) {}

    pub(crate) fn writer(&self) -> StreamWriter<T> {
        self.writer.clone()
    }

    pub(crate) fn as_writer(&self) -> &StreamWriter<T> {
        &self.writer
    }
}

impl<T> Drop for StreamTx<T> {
    fn drop(&mut self) {
        let closes = self.writer.state.closes.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(stream_id = %self.id(), closes, "stream closed");
    }
}

/// A reader of a stream.
///
/// Clones share the same read position: concurrent readers race for each item and exactly one
/// of them receives it.
#[derive(Debug)]
pub struct StreamRx<T> {
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
    state: Arc<StreamState>,
}

impl<T> StreamRx<T> {
    /// Returns the identifier of the stream.
    pub fn id(&self) -> StreamId {
        self.state.id
    }

    /// Receives the next item, or `None` once the stream is closed and drained.
    ///
    /// Cancel safe: dropping the future never loses an item.
    pub async fn recv(&self) -> Option<T> {
        self.rx.lock().await.recv().await
    }

    /// Returns `true` once the stream is closed and every item has been received.
    ///
    /// Never waits. While another reader is parked in [`StreamRx::recv`] the stream cannot have
    /// been observed as drained yet, so this returns `false`.
    pub fn is_closed(&self) -> bool {
        match self.rx.try_lock() {
            Ok(rx) => rx.is_closed() && rx.is_empty(),
            Err(_) => false,
        }
    }

    /// Returns how many times the owning writer closed the stream: `0` while open, `1` after.
    pub fn close_count(&self) -> usize {
        self.state.closes.load(Ordering::Acquire)
    }

    /// Converts this reader into a [`Stream`] of items.
    pub fn into_stream(self) -> impl Stream<Item = T> {
        futures::stream::unfold(self, |rx| async move {
            let item = rx.recv().await?;
            Some((item, rx))
        })
    }
}

impl<T> Clone for StreamRx<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
            state: self.state.clone(),
        }
    }
}
