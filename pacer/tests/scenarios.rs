use pacer::error::BatchFailure;
use pacer::scenario::{self, UNIT_DELAY};
use pacer::strategy::StrategyKind;
use pacer::Orchestrator;

#[test]
fn battery_covers_every_strategy() {
    let kinds: Vec<_> = scenario::battery().iter().map(|s| s.spec.kind()).collect();

    for kind in StrategyKind::ALL {
        assert!(kinds.contains(&kind), "no scenario for {kind}");
    }
}

#[test]
fn collect_failures_scenario_reports_every_even_unit() {
    let mut orchestrator = Orchestrator::new().unwrap();
    let scenario = scenario::find("bulk-join-collect-failures").unwrap();

    let report = orchestrator.run_batch(&scenario.spec).unwrap();

    match report.aggregate_error {
        Some(BatchFailure::Aggregate(aggregate)) => {
            let mut indices = aggregate.indices();
            indices.sort_unstable();
            assert_eq!(indices, vec![0, 2, 4, 6, 8]);
            assert!(
                aggregate
                    .failures
                    .iter()
                    .all(|f| f.identifier == format!("bulk-join-collect-failures-{}", f.index))
            );
        }
        other => panic!("expected an aggregate failure, got {other:?}"),
    }
}

#[test]
fn first_failure_scenario_reports_one_unit() {
    let mut orchestrator = Orchestrator::new().unwrap();
    let scenario = scenario::find("bulk-join-first-failure").unwrap();

    let report = orchestrator.run_batch(&scenario.spec).unwrap();

    assert!(matches!(report.aggregate_error, Some(BatchFailure::First(_))));
    assert_eq!(report.failures(), 1);
}

#[test]
fn bulk_join_non_blocking_scenario_overlaps_its_delays() {
    let mut orchestrator = Orchestrator::new().unwrap();
    let scenario = scenario::find("bulk-join-non-blocking").unwrap();

    let report = orchestrator.run_batch(&scenario.spec).unwrap();

    assert_eq!(report.successes(), 10);
    assert!(report.elapsed >= UNIT_DELAY);
    assert!(report.elapsed < UNIT_DELAY * 3, "took {:?}", report.elapsed);
}
