//! Scheduling strategies.
//!
//! A strategy drives a batch of [`WorkUnit`]s against a [`WorkerPool`] and
//! decides when the batch counts as done:
//!
//! | Strategy | In flight | Returns |
//! |---|---|---|
//! | [`Sequential`] | one unit at a time | after the last unit, or at the first failure |
//! | [`ParallelFanOut`] | every unit | as soon as every unit is issued |
//! | [`BulkJoin`] (collect all) | every unit, bounded by the pool | once every unit finished |
//! | [`BulkJoin`] (first only) | every unit, bounded by the pool | at the first failure, or once every unit finished |
//!
//! Strategies are looked up by name through a [`Registry`].

mod bulk_join;
mod fan_out;
mod sequential;

pub use bulk_join::BulkJoin;
pub use fan_out::ParallelFanOut;
pub use sequential::Sequential;

use crate::aggregate::AggregationPolicy;
use crate::error::{BatchFailure, Error, Result, SimulatedFailure};
use crate::pool::WorkerPool;
use crate::report::ExecutionResult;
use crate::unit::WorkUnit;

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The built-in strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyKind {
    Sequential,
    ParallelFanOut,
    BulkJoinAll,
    BulkJoinFailFast,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Sequential,
        StrategyKind::ParallelFanOut,
        StrategyKind::BulkJoinAll,
        StrategyKind::BulkJoinFailFast,
    ];

    /// Registry name of the strategy.
    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Sequential => "sequential",
            StrategyKind::ParallelFanOut => "parallel-fan-out",
            StrategyKind::BulkJoinAll => "bulk-join-all",
            StrategyKind::BulkJoinFailFast => "bulk-join-fail-fast",
        }
    }

    /// Whether units of this strategy run concurrently.
    pub fn is_concurrent(self) -> bool {
        self != StrategyKind::Sequential
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnknownStrategy(s.to_string()))
    }
}

/// What a strategy observed before returning.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Observed results, in completion order.
    pub results: Vec<ExecutionResult>,

    pub aggregate_error: Option<BatchFailure>,

    /// Units left running when the strategy returned.
    pub detached: usize,
}

/// A batch stopped by a unit failure.
#[derive(Debug)]
pub struct Halt {
    pub failure: SimulatedFailure,

    /// Results of the units that ran, the failing one last.
    pub completed: Vec<ExecutionResult>,

    pub not_executed: usize,
}

/// A way of driving a batch of units.
pub trait Strategy: Send + Sync {
    /// The variant this strategy implements; its name appears in reports.
    fn kind(&self) -> StrategyKind;

    /// Runs `units` against `pool`.
    ///
    /// Must be polled inside a runtime; concurrent strategies spawn one task
    /// per unit.
    fn drive(
        &self,
        units: Vec<WorkUnit>,
        pool: WorkerPool,
    ) -> BoxFuture<'static, std::result::Result<Outcome, Halt>>;
}

/// Builds a strategy.
pub type Constructor = fn() -> Box<dyn Strategy>;

/// Maps strategy names to constructors.
pub struct Registry {
    constructors: BTreeMap<String, Constructor>,
}

impl Registry {
    /// A registry without any strategy.
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// A registry holding every [`StrategyKind`] under its name.
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register(StrategyKind::Sequential.name(), sequential);
        registry.register(StrategyKind::ParallelFanOut.name(), parallel_fan_out);
        registry.register(StrategyKind::BulkJoinAll.name(), bulk_join_all);
        registry.register(StrategyKind::BulkJoinFailFast.name(), bulk_join_fail_fast);

        registry
    }

    /// Registers `constructor` under `name`, replacing any previous entry.
    pub fn register<S: Into<String>>(&mut self, name: S, constructor: Constructor) {
        self.constructors.insert(name.into(), constructor);
    }

    /// Builds the strategy registered under `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Strategy>> {
        self.constructors
            .get(name)
            .map(|constructor| constructor())
            .ok_or_else(|| Error::UnknownStrategy(name.to_string()))
    }

    /// Builds the strategy for `kind`.
    pub fn create_kind(&self, kind: StrategyKind) -> Result<Box<dyn Strategy>> {
        self.create(kind.name())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }
}

fn sequential() -> Box<dyn Strategy> {
    Box::new(Sequential)
}

fn parallel_fan_out() -> Box<dyn Strategy> {
    Box::new(ParallelFanOut)
}

fn bulk_join_all() -> Box<dyn Strategy> {
    Box::new(BulkJoin::new(AggregationPolicy::CollectAll))
}

fn bulk_join_fail_fast() -> Box<dyn Strategy> {
    Box::new(BulkJoin::new(AggregationPolicy::FirstOnly))
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.name().parse::<StrategyKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
    }

    #[test]
    fn registry_builds_every_kind() {
        let registry = Registry::new();

        for kind in StrategyKind::ALL {
            assert_eq!(registry.create_kind(kind).unwrap().kind(), kind);
        }
        assert_eq!(registry.names().count(), StrategyKind::ALL.len());
    }

    #[test]
    fn unknown_name_is_rejected() {
        let registry = Registry::new();

        assert!(matches!(
            registry.create("round-robin"),
            Err(Error::UnknownStrategy(name)) if name == "round-robin"
        ));
        assert!("round-robin".parse::<StrategyKind>().is_err());
    }

    #[test]
    fn empty_registry_knows_nothing() {
        assert!(Registry::empty().create("sequential").is_err());
    }
}
