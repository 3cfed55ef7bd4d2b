//! Per-unit results and per-batch reports.

use crate::error::{BatchFailure, SimulatedFailure};
use crate::strategy::StrategyKind;

use std::fmt;
use std::time::Duration;

/// Outcome of a single unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub index: usize,
    pub identifier: String,

    /// `Err` carries the unit's simulated failure.
    pub outcome: Result<(), SimulatedFailure>,

    /// Rank of this completion within the batch, assigned when the unit
    /// finished. Equals `index` for a sequential batch.
    pub completion_order: usize,

    /// Wall time of the unit, slot waits included.
    pub elapsed: Duration,

    /// Executor worker that first polled the unit.
    pub started_on: Option<usize>,

    /// Executor worker that polled the unit last.
    pub finished_on: Option<usize>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn failure(&self) -> Option<&SimulatedFailure> {
        self.outcome.as_ref().err()
    }

    pub(crate) fn ranked(mut self, completion_order: usize) -> Self {
        self.completion_order = completion_order;
        self
    }
}

/// Everything observed about one batch run.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub strategy: StrategyKind,
    pub unit_count: usize,

    /// Wall time from invoking the strategy to its return.
    pub elapsed: Duration,

    /// Observed unit results, ordered by completion order. Empty for a
    /// fan-out batch; partial for a fail-fast batch.
    pub results: Vec<ExecutionResult>,

    /// Present iff the aggregation policy surfaced at least one failure.
    pub aggregate_error: Option<BatchFailure>,

    /// Units still in flight when the strategy returned.
    pub detached: usize,

    pub pool_capacity: usize,

    /// Largest number of pool slots held at once, up to the strategy's return.
    pub peak_in_use: usize,
}

impl ExecutionReport {
    pub fn successes(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failures(&self) -> usize {
        self.results.len() - self.successes()
    }

    /// One-line summary of the batch.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} unit(s) in {:?} ({} succeeded, {} failed, {} detached)",
            self.strategy,
            self.unit_count,
            self.elapsed,
            self.successes(),
            self.failures(),
            self.detached,
        )
    }
}

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())?;
        write!(
            f,
            "\n  pool: {} slot(s), peak {} in use",
            self.pool_capacity, self.peak_in_use
        )?;

        if let Some(error) = &self.aggregate_error {
            write!(f, "\n  error: {error}")?;
        }

        Ok(())
    }
}
