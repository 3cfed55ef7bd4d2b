//! Batch configuration and the top-level batch runner.

use crate::error::{Error, HaltedBatch, Result};
use crate::pool::WorkerPool;
use crate::report::ExecutionReport;
use crate::runtime::Runtime;
use crate::runtime::builder::RuntimeBuilder;
use crate::strategy::{Registry, StrategyKind};
use crate::time;
use crate::unit::{ExecutionMode, FailureRule, FollowUp, WorkUnit};

use std::thread;
use std::time::Duration;

/// Parameters of one batch.
///
/// # Examples
///
/// ```rust,ignore
/// let spec = BatchSpec::new(StrategyKind::BulkJoinAll)
///     .units(100)
///     .delay(Duration::from_millis(20))
///     .mode(ExecutionMode::Blocking)
///     .pool_capacity(20);
/// ```
#[derive(Debug, Clone)]
pub struct BatchSpec {
    kind: StrategyKind,
    units: usize,
    delay: Duration,
    mode: ExecutionMode,
    failure_rule: Option<FailureRule>,
    pool_capacity: usize,
    follow_up: Option<FollowUp>,
    label: String,
}

impl BatchSpec {
    /// 10 non-blocking units of 500 ms that never fail, on a pool as wide as
    /// the machine.
    pub fn new(kind: StrategyKind) -> Self {
        let pool_capacity = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self {
            kind,
            units: 10,
            delay: Duration::from_millis(500),
            mode: ExecutionMode::NonBlocking,
            failure_rule: None,
            pool_capacity,
            follow_up: None,
            label: "unit".to_string(),
        }
    }

    /// Sets the number of units.
    pub fn units(mut self, units: usize) -> Self {
        self.units = units;
        self
    }

    /// Sets the primary delay of every unit.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets how every unit spends its primary delay.
    pub fn mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Makes units whose index matches `rule` fail.
    pub fn failure_rule(mut self, rule: FailureRule) -> Self {
        self.failure_rule = Some(rule);
        self
    }

    /// Sets the pool capacity. `0` is rejected when the batch runs.
    pub fn pool_capacity(mut self, capacity: usize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Gives every unit a follow-up phase.
    pub fn follow_up(mut self, follow_up: FollowUp) -> Self {
        self.follow_up = Some(follow_up);
        self
    }

    /// Prefix of unit identifiers: unit `i` is named `"{label}-{i}"`.
    pub fn label<S: Into<String>>(mut self, label: S) -> Self {
        self.label = label.into();
        self
    }

    /// The strategy that runs the batch.
    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    /// Number of units.
    pub fn unit_count(&self) -> usize {
        self.units
    }

    /// Primary delay of every unit.
    pub fn unit_delay(&self) -> Duration {
        self.delay
    }

    /// Mode of every unit.
    pub fn unit_mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Pool capacity the batch runs with.
    pub fn capacity(&self) -> usize {
        self.pool_capacity
    }

    /// Rejects parameters no batch can run with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBatch`] if the pool capacity is `0`.
    pub fn validate(&self) -> Result<()> {
        if self.pool_capacity == 0 {
            return Err(Error::invalid_batch("pool capacity must be > 0"));
        }

        Ok(())
    }

    /// Fresh units `0..units` for one run.
    pub fn build_units(&self) -> Vec<WorkUnit> {
        (0..self.units)
            .map(|index| {
                let mut unit = WorkUnit::new(
                    index,
                    format!("{}-{index}", self.label),
                    self.delay,
                    self.mode,
                );

                if let Some(rule) = &self.failure_rule {
                    unit = unit.with_failure_rule(rule.clone());
                }
                if let Some(follow_up) = self.follow_up {
                    unit = unit.with_follow_up(follow_up);
                }

                unit
            })
            .collect()
    }
}

/// Runs batches and times them.
///
/// Owns the executor runtime every batch runs on. The runtime always has
/// more worker threads than the batch's pool has slots, so that every slot
/// can block a thread while the driving task still makes progress; it is
/// rebuilt larger when a batch needs it.
///
/// Units detached by [`StrategyKind::ParallelFanOut`] or
/// [`StrategyKind::BulkJoinFailFast`] keep running on the runtime after
/// [`run_batch`](Self::run_batch) returns. Dropping the orchestrator (or
/// growing its runtime) waits for detached units that are blocking a
/// thread and drops the ones that are suspended.
pub struct Orchestrator {
    runtime: Runtime,
    registry: Registry,
}

impl Orchestrator {
    /// An orchestrator with the built-in strategies and one worker thread
    /// per logical CPU.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Starts configuring an orchestrator.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Current number of executor worker threads.
    pub fn worker_threads(&self) -> usize {
        self.runtime.worker_threads()
    }

    /// Strategies this orchestrator can run.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The runtime batches run on.
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Runs one batch and reports on it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidBatch`] if the pool capacity is `0`, before any unit
    ///   runs.
    /// - [`Error::UnknownStrategy`] if the registry has no entry for the
    ///   batch's strategy.
    /// - [`Error::Halted`] when a sequential batch stops at a failing unit.
    /// - [`Error::Runtime`] if a larger runtime cannot be started.
    ///
    /// Unit failures of the concurrent strategies are never errors; they are
    /// reported through [`ExecutionReport::aggregate_error`].
    pub fn run_batch(&mut self, spec: &BatchSpec) -> Result<ExecutionReport> {
        spec.validate()?;

        let strategy = self.registry.create_kind(spec.kind)?;
        self.reserve_worker_threads(spec.pool_capacity + 1)?;

        let pool = WorkerPool::new(spec.pool_capacity);
        let units = spec.build_units();

        let _span = tracing::info_span!(
            "batch",
            strategy = %spec.kind,
            units = spec.units,
            capacity = spec.pool_capacity
        )
        .entered();

        tracing::info!(mode = %spec.mode, delay = ?spec.delay, "batch started");

        let (outcome, elapsed) = self
            .runtime
            .block_on(time::instrumented(strategy.drive(units, pool.clone())));

        match outcome {
            Ok(outcome) => {
                let report = ExecutionReport {
                    strategy: spec.kind,
                    unit_count: spec.units,
                    elapsed,
                    results: outcome.results,
                    aggregate_error: outcome.aggregate_error,
                    detached: outcome.detached,
                    pool_capacity: spec.pool_capacity,
                    peak_in_use: pool.peak_in_use(),
                };

                tracing::info!(
                    ?elapsed,
                    observed = report.results.len(),
                    failures = report.failures(),
                    detached = report.detached,
                    peak_in_use = report.peak_in_use,
                    "batch finished"
                );

                Ok(report)
            }
            Err(halt) => {
                tracing::warn!(
                    index = halt.failure.index,
                    not_executed = halt.not_executed,
                    ?elapsed,
                    "batch halted"
                );

                Err(HaltedBatch {
                    strategy: spec.kind,
                    failure: halt.failure,
                    completed: halt.completed,
                    not_executed: halt.not_executed,
                    elapsed,
                }
                .into())
            }
        }
    }

    fn reserve_worker_threads(&mut self, needed: usize) -> Result<()> {
        if self.runtime.worker_threads() >= needed {
            return Ok(());
        }

        tracing::debug!(
            from = self.runtime.worker_threads(),
            to = needed,
            "growing runtime"
        );

        self.runtime = RuntimeBuilder::new().worker_threads(needed).build()?;
        Ok(())
    }
}

/// Builder for an [`Orchestrator`].
pub struct OrchestratorBuilder {
    worker_threads: Option<usize>,
    registry: Option<Registry>,
}

impl OrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            worker_threads: None,
            registry: None,
        }
    }

    /// Minimum number of executor worker threads.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn worker_threads(mut self, n: usize) -> Self {
        assert!(n > 0, "worker_threads must be > 0");

        self.worker_threads = Some(n);
        self
    }

    /// Replaces the built-in strategy registry.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Starts the runtime.
    pub fn build(self) -> Result<Orchestrator> {
        let mut builder = RuntimeBuilder::new();
        if let Some(n) = self.worker_threads {
            builder = builder.worker_threads(n);
        }

        Ok(Orchestrator {
            runtime: builder.build()?,
            registry: self.registry.unwrap_or_default(),
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one batch on a one-shot [`Orchestrator`].
///
/// Units `0..unit_count` are named `unit-{index}`. See
/// [`Orchestrator::run_batch`] for the errors. Detached units of a fan-out or
/// fail-fast batch do not outlive this call.
pub fn run_batch(
    kind: StrategyKind,
    unit_count: usize,
    delay: Duration,
    mode: ExecutionMode,
    failure_rule: Option<FailureRule>,
    pool_capacity: usize,
) -> Result<ExecutionReport> {
    let mut spec = BatchSpec::new(kind)
        .units(unit_count)
        .delay(delay)
        .mode(mode)
        .pool_capacity(pool_capacity);

    if let Some(rule) = failure_rule {
        spec = spec.failure_rule(rule);
    }

    // Validate before spinning a runtime up.
    spec.validate()?;

    Orchestrator::builder()
        .worker_threads(pool_capacity + 1)
        .build()?
        .run_batch(&spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_defaults() {
        let spec = BatchSpec::new(StrategyKind::Sequential);

        assert_eq!(spec.unit_count(), 10);
        assert_eq!(spec.unit_delay(), Duration::from_millis(500));
        assert_eq!(spec.unit_mode(), ExecutionMode::NonBlocking);
        assert!(spec.capacity() > 0);
    }

    #[test]
    fn units_are_indexed_and_labelled() {
        let units = BatchSpec::new(StrategyKind::BulkJoinAll)
            .units(3)
            .label("sample")
            .failure_rule(FailureRule::even_indices())
            .build_units();

        let names: Vec<_> = units.iter().map(|u| u.identifier().to_string()).collect();

        assert_eq!(names, ["sample-0", "sample-1", "sample-2"]);
        assert!(units.iter().enumerate().all(|(i, u)| u.index() == i));
        assert!(units.iter().all(|u| u.failure_rule().is_some()));
    }

    #[test]
    fn zero_capacity_is_invalid() {
        let spec = BatchSpec::new(StrategyKind::BulkJoinAll).pool_capacity(0);

        assert!(matches!(spec.validate(), Err(Error::InvalidBatch(_))));
    }
}
