//! # Pacer
//!
//! **Pacer** is a scheduling-semantics harness. It runs batches of simulated
//! units of work through different scheduling strategies and measures what
//! happens: how blocking and yielding work compete for a bounded worker
//! pool, in which order joins observe completions, how failures surface, and
//! how wall-clock time differs across strategies for the same workload.
//!
//! Pacer ships its own small executor so that the experiment is fully
//! observable:
//!
//! - A **work-stealing runtime** with a global injector and per-worker queues
//! - A **timer reactor** so non-blocking delays hold no thread
//! - A **bounded worker pool** of execution slots with FIFO hand-off
//! - Four **strategies**: sequential, parallel fan-out, bulk join collecting
//!   every failure, and bulk join stopping at the first failure
//! - A fixed **battery of scenarios**
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pacer::{BatchSpec, ExecutionMode, FailureRule, Orchestrator, StrategyKind};
//! use std::time::Duration;
//!
//! fn main() -> pacer::Result<()> {
//!     let mut orchestrator = Orchestrator::new()?;
//!
//!     let spec = BatchSpec::new(StrategyKind::BulkJoinAll)
//!         .units(10)
//!         .delay(Duration::from_millis(50))
//!         .mode(ExecutionMode::NonBlocking)
//!         .failure_rule(FailureRule::even_indices())
//!         .pool_capacity(4);
//!
//!     let report = orchestrator.run_batch(&spec)?;
//!     println!("{report}");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`unit`]: Work units, execution modes and failure rules
//! - [`pool`]: The bounded worker pool
//! - [`strategy`]: Scheduling strategies and their registry
//! - [`aggregate`]: Error-aggregation policies of the bulk joins
//! - [`report`]: Per-unit results and per-batch reports
//! - [`scenario`]: The battery of named experiments
//! - [`task`] and [`time`]: Runtime primitives

mod orchestrator;
mod reactor;
mod runtime;

pub mod aggregate;
pub mod error;
pub mod pool;
pub mod report;
pub mod scenario;
pub mod strategy;
pub mod time;
pub mod unit;

pub use error::{Error, Result};
pub use orchestrator::{BatchSpec, Orchestrator, OrchestratorBuilder, run_batch};
pub use report::{ExecutionReport, ExecutionResult};
pub use runtime::builder::RuntimeBuilder;
pub use runtime::{Runtime, task};
pub use strategy::StrategyKind;
pub use unit::{ExecutionMode, FailureRule, FollowUp, WorkUnit};

pub use pacer_macros::*;
