//! Error-aggregation policies of the bulk-join strategies.

use crate::error::{AggregateFailure, BatchFailure, FirstFailure, SimulatedFailure};
use crate::report::ExecutionResult;

/// Which failures a bulk join surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationPolicy {
    /// Wait for every unit; report all failures together.
    CollectAll,

    /// Stop waiting at the first failure; report only that one.
    FirstOnly,
}

/// Whether the fan-in should keep waiting for completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Stop,
}

/// Folds unit results, observed in completion order, into the batch failure
/// its policy calls for.
#[derive(Debug)]
pub struct ExceptionAggregator {
    policy: AggregationPolicy,
    failures: Vec<SimulatedFailure>,
}

impl ExceptionAggregator {
    pub fn new(policy: AggregationPolicy) -> Self {
        Self {
            policy,
            failures: Vec::new(),
        }
    }

    pub fn policy(&self) -> AggregationPolicy {
        self.policy
    }

    /// Records one completed unit.
    ///
    /// `CollectAll` always continues. `FirstOnly` stops once it holds a
    /// failure and ignores anything observed afterwards.
    pub fn observe(&mut self, result: &ExecutionResult) -> Verdict {
        if self.policy == AggregationPolicy::FirstOnly && !self.failures.is_empty() {
            return Verdict::Stop;
        }

        if let Some(failure) = result.failure() {
            self.failures.push(failure.clone());
        }

        match self.policy {
            AggregationPolicy::FirstOnly if !self.failures.is_empty() => Verdict::Stop,
            _ => Verdict::Continue,
        }
    }

    /// The batch failure, or `None` if no observed unit failed.
    pub fn finish(self) -> Option<BatchFailure> {
        if self.failures.is_empty() {
            return None;
        }

        Some(match self.policy {
            AggregationPolicy::CollectAll => AggregateFailure {
                failures: self.failures,
            }
            .into(),
            AggregationPolicy::FirstOnly => {
                FirstFailure(self.failures.into_iter().next()?).into()
            }
        })
    }
}
