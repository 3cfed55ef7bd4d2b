//! Simulated units of work.

use crate::error::SimulatedFailure;
use crate::pool::{SlotGuard, WorkerPool};
use crate::report::ExecutionResult;
use crate::runtime::context;
use crate::time;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How a unit spends its delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Parks the executing worker thread for the whole delay, holding a slot.
    Blocking,

    /// Suspends on a timer, holding neither a thread nor a slot.
    NonBlocking,
}

impl ExecutionMode {
    /// The lowercase name used in reports and accepted by `FromStr`.
    pub fn name(self) -> &'static str {
        match self {
            ExecutionMode::Blocking => "blocking",
            ExecutionMode::NonBlocking => "non-blocking",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blocking" => Ok(ExecutionMode::Blocking),
            "non-blocking" | "nonblocking" => Ok(ExecutionMode::NonBlocking),
            other => Err(format!("unknown execution mode `{other}`")),
        }
    }
}

/// A deterministic predicate over unit indices deciding which units fail.
#[derive(Clone)]
pub struct FailureRule {
    label: String,
    predicate: Arc<dyn Fn(usize) -> bool + Send + Sync>,
}

impl FailureRule {
    /// Creates a rule from a label (used in failure messages and unit
    /// identifiers) and a predicate.
    pub fn new<S, F>(label: S, predicate: F) -> Self
    where
        S: Into<String>,
        F: Fn(usize) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Fails every unit whose index is even.
    pub fn even_indices() -> Self {
        Self::new("even-index", |index| index % 2 == 0)
    }

    /// The rule's label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns `true` if the unit at `index` should fail.
    pub fn matches(&self, index: usize) -> bool {
        (self.predicate)(index)
    }
}

impl fmt::Debug for FailureRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FailureRule").field(&self.label).finish()
    }
}

/// Extra delays a unit performs after its primary delay.
///
/// Blocking steps keep one slot across every step. Non-blocking steps hold
/// no slot while they wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowUp {
    /// Number of extra delays.
    pub steps: usize,

    /// Length of each extra delay.
    pub step_delay: Duration,

    /// How every step waits.
    pub mode: ExecutionMode,
}

impl FollowUp {
    /// Creates a follow-up phase of `steps` delays of `step_delay` each.
    pub fn new(steps: usize, step_delay: Duration, mode: ExecutionMode) -> Self {
        Self {
            steps,
            step_delay,
            mode,
        }
    }

    /// Total time spent in follow-up steps, saturating at [`Duration::MAX`].
    pub fn total_delay(&self) -> Duration {
        u32::try_from(self.steps).map_or(Duration::MAX, |steps| {
            self.step_delay.saturating_mul(steps)
        })
    }
}

/// One simulated unit of work.
///
/// A unit is consumed by [`run`](Self::run): it executes exactly once, and a
/// new batch run builds new units.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    index: usize,
    identifier: String,
    delay: Duration,
    mode: ExecutionMode,
    failure_rule: Option<FailureRule>,
    follow_up: Option<FollowUp>,
}

impl WorkUnit {
    /// Creates a unit that never fails and has no follow-up phase.
    pub fn new<S: Into<String>>(
        index: usize,
        identifier: S,
        delay: Duration,
        mode: ExecutionMode,
    ) -> Self {
        Self {
            index,
            identifier: identifier.into(),
            delay,
            mode,
            failure_rule: None,
            follow_up: None,
        }
    }

    /// Makes the unit fail when `rule` matches its index.
    pub fn with_failure_rule(mut self, rule: FailureRule) -> Self {
        self.failure_rule = Some(rule);
        self
    }

    /// Adds a phase of extra delays after the primary one.
    pub fn with_follow_up(mut self, follow_up: FollowUp) -> Self {
        self.follow_up = Some(follow_up);
        self
    }

    /// Position of the unit within its batch.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Label carried into the unit's result.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The primary delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// How the primary delay is spent.
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// The failure rule, if any.
    pub fn failure_rule(&self) -> Option<&FailureRule> {
        self.failure_rule.as_ref()
    }

    /// The follow-up phase, if any.
    pub fn follow_up(&self) -> Option<FollowUp> {
        self.follow_up
    }

    /// Runs the unit against `pool` and reports its outcome.
    ///
    /// - **Blocking**: acquires a slot and holds it while the current worker
    ///   thread sleeps for the whole delay.
    /// - **NonBlocking**: acquires a slot just long enough to arm the timer,
    ///   releases it, waits, then reacquires a slot (any slot) to finish.
    ///
    /// In both modes the failure rule is evaluated while a slot is held, and
    /// the slot is released before returning. The returned result carries a
    /// completion order of `0`; the strategy's fan-in stamps the real one.
    pub async fn run(self, pool: &WorkerPool) -> ExecutionResult {
        let started = Instant::now();
        let started_on = context::current_worker();

        let held = match self.mode {
            ExecutionMode::Blocking => {
                let slot = pool.acquire().await;
                thread::sleep(self.delay);
                Some(slot)
            }
            ExecutionMode::NonBlocking => {
                let timer = {
                    let _slot = pool.acquire().await;
                    time::sleep(self.delay)
                };
                timer.await;
                None
            }
        };

        let held = match self.follow_up {
            Some(follow_up) => run_follow_up(follow_up, held, pool).await,
            None => held,
        };

        let slot = match held {
            Some(slot) => slot,
            None => pool.acquire().await,
        };
        let outcome = self.evaluate();
        drop(slot);

        let elapsed = started.elapsed();
        let finished_on = context::current_worker();

        tracing::debug!(
            index = self.index,
            identifier = %self.identifier,
            mode = %self.mode,
            failed = outcome.is_err(),
            ?elapsed,
            "unit finished"
        );

        ExecutionResult {
            index: self.index,
            identifier: self.identifier,
            outcome,
            completion_order: 0,
            elapsed,
            started_on,
            finished_on,
        }
    }

    fn evaluate(&self) -> Result<(), SimulatedFailure> {
        match &self.failure_rule {
            Some(rule) if rule.matches(self.index) => Err(SimulatedFailure {
                index: self.index,
                identifier: self.identifier.clone(),
                message: format!("failure rule `{}` matched", rule.label()),
            }),
            _ => Ok(()),
        }
    }
}

async fn run_follow_up(
    follow_up: FollowUp,
    held: Option<SlotGuard>,
    pool: &WorkerPool,
) -> Option<SlotGuard> {
    match follow_up.mode {
        ExecutionMode::Blocking => {
            let slot = match held {
                Some(slot) => slot,
                None => pool.acquire().await,
            };

            for _ in 0..follow_up.steps {
                thread::sleep(follow_up.step_delay);
            }

            Some(slot)
        }
        ExecutionMode::NonBlocking => {
            drop(held);

            for _ in 0..follow_up.steps {
                time::sleep(follow_up.step_delay).await;
            }

            None
        }
    }
}
