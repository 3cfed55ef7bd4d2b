use pacer::error::BatchFailure;
use pacer::strategy::StrategyKind;
use pacer::{BatchSpec, Error, ExecutionMode, FailureRule, Orchestrator, run_batch};
use std::collections::BTreeSet;
use std::time::Duration;

const DELAY: Duration = Duration::from_millis(50);

fn orchestrator() -> Orchestrator {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    Orchestrator::builder().worker_threads(2).build().unwrap()
}

#[test]
fn bulk_join_all_reports_every_even_failure() {
    let mut orchestrator = orchestrator();

    for n in [1, 7, 10] {
        let spec = BatchSpec::new(StrategyKind::BulkJoinAll)
            .units(n)
            .delay(Duration::from_millis(1))
            .failure_rule(FailureRule::even_indices())
            .pool_capacity(4);

        let report = orchestrator.run_batch(&spec).unwrap();

        assert_eq!(report.failures(), n.div_ceil(2));
        assert_eq!(report.successes(), n / 2);

        let Some(BatchFailure::Aggregate(aggregate)) = &report.aggregate_error else {
            panic!("expected an aggregate failure, got {:?}", report.aggregate_error);
        };
        let failed: BTreeSet<_> = aggregate.indices().into_iter().collect();
        assert_eq!(failed, (0..n).step_by(2).collect());
    }
}

#[test]
fn bulk_join_fail_fast_reports_one_even_failure() {
    let mut orchestrator = orchestrator();
    let spec = BatchSpec::new(StrategyKind::BulkJoinFailFast)
        .units(10)
        .delay(Duration::from_millis(1))
        .failure_rule(FailureRule::even_indices())
        .pool_capacity(4);

    let report = orchestrator.run_batch(&spec).unwrap();

    let Some(BatchFailure::First(first)) = &report.aggregate_error else {
        panic!("expected a first failure, got {:?}", report.aggregate_error);
    };
    assert_eq!(first.0.index % 2, 0);
    assert_eq!(report.failures(), 1);
    assert_eq!(report.results.len() + report.detached, 10);
}

#[test]
fn sequential_blocking_takes_the_sum_of_delays() {
    let mut orchestrator = orchestrator();
    let spec = BatchSpec::new(StrategyKind::Sequential)
        .units(10)
        .delay(DELAY)
        .mode(ExecutionMode::Blocking)
        .pool_capacity(4);

    let report = orchestrator.run_batch(&spec).unwrap();

    assert!(report.elapsed >= DELAY * 10, "took {:?}", report.elapsed);
    assert!(
        report
            .results
            .iter()
            .enumerate()
            .all(|(i, r)| r.index == i && r.completion_order == i)
    );
}

#[test]
fn bulk_join_non_blocking_takes_about_one_delay() {
    let mut orchestrator = orchestrator();
    let spec = BatchSpec::new(StrategyKind::BulkJoinAll)
        .units(10)
        .delay(DELAY)
        .mode(ExecutionMode::NonBlocking)
        .pool_capacity(10);

    let report = orchestrator.run_batch(&spec).unwrap();

    assert!(report.elapsed >= DELAY);
    assert!(report.elapsed < DELAY * 5, "took {:?}", report.elapsed);
    assert!(report.aggregate_error.is_none());
}

#[test]
fn single_slot_pool_serializes_blocking_units_only() {
    let mut orchestrator = orchestrator();
    let delay = Duration::from_millis(100);

    let non_blocking = BatchSpec::new(StrategyKind::BulkJoinAll)
        .units(10)
        .delay(delay)
        .mode(ExecutionMode::NonBlocking)
        .pool_capacity(1);
    let report = orchestrator.run_batch(&non_blocking).unwrap();

    assert_eq!(report.results.len(), 10);
    assert_eq!(report.peak_in_use, 1);
    assert!(report.elapsed >= delay);
    assert!(report.elapsed < delay * 5, "took {:?}", report.elapsed);

    let blocking = non_blocking.mode(ExecutionMode::Blocking);
    let report = orchestrator.run_batch(&blocking).unwrap();

    assert_eq!(report.results.len(), 10);
    assert_eq!(report.peak_in_use, 1);
    assert!(report.elapsed >= delay * 10, "took {:?}", report.elapsed);
}

#[test]
fn bulk_join_blocking_runs_in_waves_of_capacity() {
    let mut orchestrator = orchestrator();
    let spec = BatchSpec::new(StrategyKind::BulkJoinAll)
        .units(100)
        .delay(DELAY)
        .mode(ExecutionMode::Blocking)
        .pool_capacity(20);

    let report = orchestrator.run_batch(&spec).unwrap();

    assert!(orchestrator.worker_threads() >= 21);
    assert!(report.elapsed >= DELAY * 5, "took {:?}", report.elapsed);
    assert!(report.elapsed < DELAY * 15, "took {:?}", report.elapsed);
    assert_eq!(report.peak_in_use, 20);
}

#[test]
fn concurrent_results_cover_every_index() {
    let mut orchestrator = orchestrator();

    for kind in [StrategyKind::BulkJoinAll, StrategyKind::BulkJoinFailFast] {
        let spec = BatchSpec::new(kind)
            .units(25)
            .delay(Duration::from_millis(5))
            .pool_capacity(6);

        let report = orchestrator.run_batch(&spec).unwrap();
        let indices: BTreeSet<_> = report.results.iter().map(|r| r.index).collect();

        assert_eq!(indices, (0..25).collect());
        assert!(report.peak_in_use <= report.pool_capacity);
    }
}

#[test]
fn fan_out_returns_well_before_the_delay() {
    let mut orchestrator = orchestrator();
    let spec = BatchSpec::new(StrategyKind::ParallelFanOut)
        .units(10)
        .delay(Duration::from_millis(500))
        .mode(ExecutionMode::NonBlocking)
        .pool_capacity(4);

    let report = orchestrator.run_batch(&spec).unwrap();

    assert!(report.elapsed < Duration::from_millis(100), "took {:?}", report.elapsed);
    assert!(report.results.is_empty());
    assert_eq!(report.detached, 10);
}

#[test]
fn no_failures_means_identical_results_for_both_policies() {
    let mut orchestrator = orchestrator();
    let mut seen = Vec::new();

    for kind in [StrategyKind::BulkJoinAll, StrategyKind::BulkJoinFailFast] {
        let spec = BatchSpec::new(kind)
            .units(12)
            .delay(Duration::from_millis(2))
            .pool_capacity(3);

        let report = orchestrator.run_batch(&spec).unwrap();

        assert!(report.aggregate_error.is_none());
        assert_eq!(report.detached, 0);
        assert!(report.peak_in_use <= 3);

        let outcomes: BTreeSet<_> = report
            .results
            .iter()
            .map(|r| (r.index, r.is_success()))
            .collect();
        seen.push(outcomes);
    }

    assert_eq!(seen[0], seen[1]);
}

#[test]
fn sequential_halt_reports_the_rest_as_not_executed() {
    let mut orchestrator = orchestrator();
    let spec = BatchSpec::new(StrategyKind::Sequential)
        .units(10)
        .delay(Duration::from_millis(1))
        .failure_rule(FailureRule::new("index-four", |index| index == 4))
        .pool_capacity(2);

    let err = orchestrator.run_batch(&spec).unwrap_err();
    let halted = err.halted().expect("sequential failure halts the batch");

    assert_eq!(halted.failure.index, 4);
    assert_eq!(halted.not_executed, 5);
    assert_eq!(
        halted.completed.iter().map(|r| r.index).collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 4]
    );
    assert!(err.to_string().contains("5 remaining unit(s) were not executed"));
}

#[test]
fn zero_capacity_is_rejected() {
    let mut orchestrator = orchestrator();
    let spec = BatchSpec::new(StrategyKind::BulkJoinAll).pool_capacity(0);

    assert!(matches!(
        orchestrator.run_batch(&spec),
        Err(Error::InvalidBatch(_))
    ));
}

#[test]
fn unknown_strategy_name_is_rejected() {
    assert!(matches!(
        "scatter-gather".parse::<StrategyKind>(),
        Err(Error::UnknownStrategy(_))
    ));
}

#[test]
fn non_blocking_units_record_their_workers() {
    let mut orchestrator = orchestrator();
    let spec = BatchSpec::new(StrategyKind::BulkJoinAll)
        .units(8)
        .delay(Duration::from_millis(5))
        .pool_capacity(4);

    let report = orchestrator.run_batch(&spec).unwrap();

    assert!(
        report
            .results
            .iter()
            .all(|r| r.started_on.is_some() && r.finished_on.is_some())
    );
}

#[test]
fn free_function_runs_a_batch() {
    let report = run_batch(
        StrategyKind::BulkJoinAll,
        6,
        Duration::from_millis(2),
        ExecutionMode::NonBlocking,
        Some(FailureRule::even_indices()),
        3,
    )
    .unwrap();

    assert_eq!(report.unit_count, 6);
    assert_eq!(report.failures(), 3);
    assert!(report.to_string().contains("bulk-join-all"));

    assert!(matches!(
        run_batch(
            StrategyKind::Sequential,
            1,
            Duration::ZERO,
            ExecutionMode::Blocking,
            None,
            0,
        ),
        Err(Error::InvalidBatch(_))
    ));
}
