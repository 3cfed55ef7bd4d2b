//! The fixed battery of named experiments.
//!
//! Each [`Scenario`] is a preset [`BatchSpec`]; running one is just
//! [`Orchestrator::run_batch`](crate::Orchestrator::run_batch) on its spec.

use crate::orchestrator::BatchSpec;
use crate::strategy::StrategyKind;
use crate::unit::{ExecutionMode, FailureRule, FollowUp};

use std::time::Duration;

/// Primary delay of every timing scenario.
pub const UNIT_DELAY: Duration = Duration::from_millis(500);

/// Unit count of the small scenarios.
pub const UNIT_COUNT: usize = 10;

const FOLLOW_UP_STEPS: usize = 10;

/// A named, preconfigured batch.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub spec: BatchSpec,
}

impl Scenario {
    fn new(name: &'static str, description: &'static str, spec: BatchSpec) -> Self {
        Self {
            name,
            description,
            spec: spec.label(name),
        }
    }
}

/// Every scenario, in presentation order.
pub fn battery() -> Vec<Scenario> {
    let small = |kind, mode| {
        BatchSpec::new(kind)
            .units(UNIT_COUNT)
            .delay(UNIT_DELAY)
            .mode(mode)
    };
    let follow_up = |mode| FollowUp::new(FOLLOW_UP_STEPS, UNIT_DELAY, mode);

    vec![
        Scenario::new(
            "sequential-blocking",
            "awaits blocking units one at a time; wall time is the sum of the delays",
            small(StrategyKind::Sequential, ExecutionMode::Blocking),
        ),
        Scenario::new(
            "sequential-non-blocking",
            "awaits non-blocking units one at a time; yielding does not help a sequential loop",
            small(StrategyKind::Sequential, ExecutionMode::NonBlocking),
        ),
        Scenario::new(
            "fan-out-blocking",
            "issues blocking units without waiting for them",
            small(StrategyKind::ParallelFanOut, ExecutionMode::Blocking),
        ),
        Scenario::new(
            "fan-out-non-blocking",
            "issues non-blocking units without waiting; returns before any unit finished",
            small(StrategyKind::ParallelFanOut, ExecutionMode::NonBlocking),
        ),
        Scenario::new(
            "bulk-join-non-blocking",
            "waits for all non-blocking units at once; wall time is about one delay",
            small(StrategyKind::BulkJoinAll, ExecutionMode::NonBlocking)
                .pool_capacity(UNIT_COUNT),
        ),
        Scenario::new(
            "bulk-join-mixed",
            "100 units whose blocking follow-up exhausts the pool; later units queue for a slot",
            BatchSpec::new(StrategyKind::BulkJoinAll)
                .units(100)
                .delay(UNIT_DELAY)
                .mode(ExecutionMode::NonBlocking)
                .follow_up(follow_up(ExecutionMode::Blocking)),
        ),
        Scenario::new(
            "bulk-join-many",
            "10 000 non-blocking units with a non-blocking follow-up; the pool never runs dry",
            BatchSpec::new(StrategyKind::BulkJoinAll)
                .units(10_000)
                .delay(UNIT_DELAY)
                .mode(ExecutionMode::NonBlocking)
                .follow_up(follow_up(ExecutionMode::NonBlocking)),
        ),
        Scenario::new(
            "thread-hopping",
            "5 non-blocking units with a follow-up; a unit may finish on another worker than it started on",
            BatchSpec::new(StrategyKind::BulkJoinAll)
                .units(5)
                .delay(UNIT_DELAY)
                .mode(ExecutionMode::NonBlocking)
                .follow_up(follow_up(ExecutionMode::NonBlocking)),
        ),
        Scenario::new(
            "bulk-join-collect-failures",
            "even units fail; every failure is reported together",
            BatchSpec::new(StrategyKind::BulkJoinAll)
                .units(UNIT_COUNT)
                .delay(Duration::from_millis(1))
                .mode(ExecutionMode::NonBlocking)
                .failure_rule(FailureRule::even_indices()),
        ),
        Scenario::new(
            "bulk-join-first-failure",
            "even units fail; only the first observed failure is reported",
            BatchSpec::new(StrategyKind::BulkJoinFailFast)
                .units(UNIT_COUNT)
                .delay(Duration::from_millis(1))
                .mode(ExecutionMode::NonBlocking)
                .failure_rule(FailureRule::even_indices()),
        ),
    ]
}

/// Looks a scenario up by name.
pub fn find(name: &str) -> Option<Scenario> {
    battery().into_iter().find(|scenario| scenario.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    #[test]
    fn names_are_unique() {
        let battery = battery();
        let names: HashSet<_> = battery.iter().map(|s| s.name).collect();

        assert_eq!(names.len(), battery.len());
    }

    #[test]
    fn every_scenario_is_valid() {
        for scenario in battery() {
            assert!(scenario.spec.validate().is_ok(), "{}", scenario.name);
        }
    }

    #[test]
    fn find_by_name() {
        let scenario = find("bulk-join-first-failure").unwrap();

        assert_eq!(scenario.spec.kind(), StrategyKind::BulkJoinFailFast);
        assert!(find("menu").is_none());
    }
}
