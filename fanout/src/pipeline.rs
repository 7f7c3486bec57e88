//! Owner-side wiring of a complete source → fan-out → merge run.

use config::shared::PipelineConfig;
use futures::Stream;
use tracing::info;

use crate::concurrency::cancel::{CancelRx, CancelTx, create_cancel_channel};
use crate::concurrency::stream::StreamRx;
use crate::error::PipelineResult;
use crate::stages::{fan_out_with_capacity, generate, merge_with_capacity, produce};

/// Builds pipeline runs from a validated [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a pipeline, rejecting configurations with zero workers or zero stream capacity.
    pub fn new(config: PipelineConfig) -> PipelineResult<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    /// Returns the validated configuration runs are built from.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Starts a run applying `f` to every value of a finite sequence.
    ///
    /// The values are buffered up front, then `config.workers` transform stages share them and a
    /// merge stage combines their outputs. Output order is not specified.
    ///
    /// Must be called within a Tokio runtime.
    pub fn run<T, U, F, I>(&self, values: I, f: F) -> PipelineOutput<U>
    where
        T: Send + 'static,
        U: Send + 'static,
        F: Fn(T) -> U + Clone + Send + 'static,
        I: IntoIterator<Item = T>,
    {
        self.start(|_| produce(values), f)
    }

    /// Starts a run over a lazily produced, possibly unbounded, sequence.
    ///
    /// Values are pulled one at a time as transform stages ask for them. An unbounded run only
    /// ends when cancelled.
    ///
    /// Must be called within a Tokio runtime.
    pub fn run_lazy<T, U, F, I>(&self, values: I, f: F) -> PipelineOutput<U>
    where
        T: Send + 'static,
        U: Send + 'static,
        F: Fn(T) -> U + Clone + Send + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        self.start(|cancel_rx| generate(cancel_rx, values), f)
    }

    fn start<T, U, F, S>(&self, source: S, f: F) -> PipelineOutput<U>
    where
        T: Send + 'static,
        U: Send + 'static,
        F: Fn(T) -> U + Clone + Send + 'static,
        S: FnOnce(&CancelRx) -> StreamRx<T>,
    {
        let (cancel_tx, cancel_rx) = create_cancel_channel();
        let capacity = self.config.stream_capacity;

        let source = source(&cancel_rx);
        let transformed =
            fan_out_with_capacity(&cancel_rx, &source, self.config.workers, f, capacity);
        let output = merge_with_capacity(&cancel_rx, transformed, capacity);

        info!(
            workers = self.config.workers,
            stream_capacity = capacity,
            source = %source.id(),
            output = %output.id(),
            "pipeline started"
        );

        PipelineOutput { cancel_tx, output }
    }
}

/// The merged output of a pipeline run together with the run's cancellation signal.
///
/// Dropping it activates the signal, so abandoning the output early stops every stage of the run.
#[derive(Debug)]
pub struct PipelineOutput<U> {
    cancel_tx: CancelTx,
    output: StreamRx<U>,
}

impl<U> PipelineOutput<U> {
    /// Receives the next output item, or `None` once every stage has finished.
    pub async fn recv(&self) -> Option<U> {
        self.output.recv().await
    }

    /// Receives every remaining output item.
    pub async fn collect(&self) -> Vec<U> {
        let mut items = Vec::new();
        while let Some(item) = self.output.recv().await {
            items.push(item);
        }

        items
    }

    /// Stops the run. Returns `false` if it was already cancelled.
    pub fn cancel(&self) -> bool {
        self.cancel_tx.cancel()
    }

    /// Returns a handle on the run's cancellation signal, e.g. to arm a timeout.
    pub fn cancel_tx(&self) -> CancelTx {
        self.cancel_tx.clone()
    }

    /// Returns the merged output stream.
    pub fn output(&self) -> &StreamRx<U> {
        &self.output
    }

    /// Converts the output into a [`Stream`]. Dropping the stream cancels the run.
    pub fn into_stream(self) -> impl Stream<Item = U> {
        futures::stream::unfold(self, |output| async move {
            let item = output.recv().await?;
            Some((item, output))
        })
    }
}

impl<U> Drop for PipelineOutput<U> {
    fn drop(&mut self) {
        self.cancel_tx.cancel();
    }
}
