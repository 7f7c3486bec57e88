//! Squares a list of integers with a fan-out/fan-in pipeline and prints the results.
//!
//! Results are printed in completion order, which varies from run to run. With `take` set, the
//! binary stops after that many results and dropping the run's output cancels the remaining
//! stages.

use anyhow::Context;
use fanout::pipeline::Pipeline;
use telemetry::tracing::init_tracing;
use tracing::info;

use crate::settings::{SquarerConfig, load_squarer_config};

mod settings;

fn main() -> anyhow::Result<()> {
    init_tracing(env!("CARGO_BIN_NAME"))?;

    let config = load_squarer_config().context("failed to load configuration")?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(config))
}

async fn async_main(config: SquarerConfig) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(config.pipeline)?;
    let inputs = config.inputs.len();
    let limit = config.take.unwrap_or(usize::MAX);

    info!(
        workers = pipeline.config().workers,
        inputs,
        take = ?config.take,
        "squaring started"
    );

    let output = pipeline.run(config.inputs, |n: i64| n * n);

    let mut printed = 0;
    while printed < limit {
        let Some(square) = output.recv().await else {
            break;
        };

        println!("{square}");
        printed += 1;
    }

    drop(output);
    info!(inputs, printed, "squaring finished");

    Ok(())
}
