use std::collections::HashSet;

use config::shared::PipelineConfig;
use fanout::concurrency::cancel::create_cancel_channel;
use fanout::pipeline::Pipeline;
use fanout::stages::{fan_out, merge, produce, transform};
use futures::StreamExt;
use telemetry::tracing::init_test_tracing;

use crate::common::{drain, sorted, square, within_timeout};

mod common;

fn pipeline(workers: usize) -> Pipeline {
    Pipeline::new(PipelineConfig {
        workers,
        ..PipelineConfig::default()
    })
    .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn two_squarers_share_one_source() {
    init_test_tracing();

    let (_cancel_tx, cancel_rx) = create_cancel_channel();
    let source = produce(vec![2, 3]);

    let first = transform(&cancel_rx, source.clone(), square);
    let second = transform(&cancel_rx, source, square);
    let merged = merge(&cancel_rx, vec![first.clone(), second.clone()]);

    assert_eq!(sorted(drain(&merged).await), vec![4, 9]);

    for stream in [&first, &second, &merged] {
        assert_eq!(stream.close_count(), 1);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_input_closes_without_items() {
    init_test_tracing();

    let output = pipeline(2).run(Vec::<i64>::new(), square);

    assert!(within_timeout("empty run", output.collect()).await.is_empty());
    assert_eq!(output.output().close_count(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn output_multiset_matches_input_for_any_worker_count() {
    init_test_tracing();

    let inputs: Vec<i64> = (-50..150).collect();
    let expected = sorted(inputs.iter().copied().map(square).collect());

    for workers in 1..=8 {
        let output = pipeline(workers).run(inputs.clone(), square);
        let squares = within_timeout("run to finish", output.collect()).await;

        assert_eq!(sorted(squares), expected, "mismatch with {workers} workers");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn thousand_values_through_eight_workers() {
    init_test_tracing();

    let output = pipeline(8).run(0..1000, square);
    let squares = within_timeout("run to finish", output.collect()).await;

    assert_eq!(squares.len(), 1000);
    assert_eq!(squares.iter().collect::<HashSet<_>>().len(), 1000);
    assert_eq!(sorted(squares), (0..1000).map(square).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread")]
async fn larger_stream_capacity_gives_same_results() {
    init_test_tracing();

    let pipeline = Pipeline::new(PipelineConfig {
        workers: 3,
        stream_capacity: 16,
    })
    .unwrap();

    let output = pipeline.run(0..100, square);
    let squares = within_timeout("run to finish", output.collect()).await;

    assert_eq!(sorted(squares), (0..100).map(square).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread")]
async fn failures_travel_as_items() {
    init_test_tracing();

    let (_cancel_tx, cancel_rx) = create_cancel_channel();
    let source = produce(vec![4, 0, 2, 0, 1]);
    let outputs = fan_out(&cancel_rx, &source, 3, |n: i64| {
        if n == 0 {
            Err(format!("cannot divide by {n}"))
        } else {
            Ok(8 / n)
        }
    });
    let merged = merge(&cancel_rx, outputs);

    let results = drain(&merged).await;
    let (ok, failed): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);

    assert_eq!(
        sorted(ok.into_iter().map(Result::unwrap).collect()),
        vec![2, 4, 8]
    );
    assert_eq!(failed.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn panicking_worker_leaves_the_rest_of_the_run_intact() {
    init_test_tracing();

    let (_cancel_tx, cancel_rx) = create_cancel_channel();
    let source = produce(vec![1, 0, 2, 3, 4, 5]);
    let outputs = fan_out(&cancel_rx, &source, 3, |n: i64| {
        assert_ne!(n, 0, "zero is not a valid input");
        n
    });
    let merged = merge(&cancel_rx, outputs.clone());

    assert_eq!(sorted(drain(&merged).await), vec![1, 2, 3, 4, 5]);

    for stream in outputs.iter().chain([&merged]) {
        assert_eq!(stream.close_count(), 1);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn output_works_as_a_futures_stream() {
    init_test_tracing();

    let squares = pipeline(2)
        .run(vec![2, 3], square)
        .into_stream()
        .collect::<Vec<_>>();

    assert_eq!(sorted(within_timeout("stream", squares).await), vec![4, 9]);
}
