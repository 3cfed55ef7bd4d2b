//! Error types of the harness.
//!
//! Unit failures are values, not panics. A [`SimulatedFailure`] is produced
//! by a single unit; the bulk-join strategies fold them into a
//! [`BatchFailure`] according to their aggregation policy; only the
//! sequential strategy turns one into an [`Error`].

use std::fmt;
use std::io;
use std::time::Duration;

use crate::report::ExecutionResult;
use crate::strategy::StrategyKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Deterministic failure raised by a work unit whose failure rule matched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unit {identifier} (index {index}) failed: {message}")]
pub struct SimulatedFailure {
    /// Index of the failing unit within its batch.
    pub index: usize,

    /// Label of the failing unit.
    pub identifier: String,

    /// What made the unit fail.
    pub message: String,
}

/// Every failure of a batch, in completion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateFailure {
    pub failures: Vec<SimulatedFailure>,
}

impl AggregateFailure {
    /// Indices of the failed units, in completion order.
    pub fn indices(&self) -> Vec<usize> {
        self.failures.iter().map(|failure| failure.index).collect()
    }
}

impl fmt::Display for AggregateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} unit(s) failed", self.failures.len())?;

        for failure in &self.failures {
            write!(f, "\n  - {failure}")?;
        }

        Ok(())
    }
}

impl std::error::Error for AggregateFailure {}

/// The first failure observed in a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("first failure: {0}")]
pub struct FirstFailure(pub SimulatedFailure);

/// Failure surfaced by a bulk-join aggregation policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchFailure {
    #[error(transparent)]
    Aggregate(#[from] AggregateFailure),

    #[error(transparent)]
    First(#[from] FirstFailure),
}

impl BatchFailure {
    /// The failures carried, in completion order.
    pub fn failures(&self) -> &[SimulatedFailure] {
        match self {
            BatchFailure::Aggregate(aggregate) => &aggregate.failures,
            BatchFailure::First(first) => std::slice::from_ref(&first.0),
        }
    }
}

/// A sequential batch stopped at its first failing unit.
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "{strategy} batch halted after {elapsed:?}: {failure}; {not_executed} remaining unit(s) were not executed"
)]
pub struct HaltedBatch {
    pub strategy: StrategyKind,

    /// The failure that stopped the batch.
    pub failure: SimulatedFailure,

    /// Results of the units that ran, the failing one last.
    pub completed: Vec<ExecutionResult>,

    /// Units that were never started.
    pub not_executed: usize,

    pub elapsed: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid batch: {0}")]
    InvalidBatch(String),

    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),

    #[error(transparent)]
    Halted(Box<HaltedBatch>),

    #[error("runtime error: {0}")]
    Runtime(#[from] io::Error),
}

impl Error {
    pub fn invalid_batch<S: Into<String>>(msg: S) -> Self {
        Error::InvalidBatch(msg.into())
    }

    /// The halted batch, if this error stopped a sequential run.
    pub fn halted(&self) -> Option<&HaltedBatch> {
        match self {
            Error::Halted(halted) => Some(halted),
            _ => None,
        }
    }
}

impl From<HaltedBatch> for Error {
    fn from(halted: HaltedBatch) -> Self {
        Error::Halted(Box::new(halted))
    }
}
