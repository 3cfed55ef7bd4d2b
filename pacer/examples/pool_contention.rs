//! Example: blocking units exhaust a small pool, non-blocking ones do not

use pacer::pool::WorkerPool;
use pacer::strategy::{Registry, StrategyKind};
use pacer::time::instrumented;
use pacer::{BatchSpec, ExecutionMode};
use std::time::Duration;

#[pacer::main(worker_threads = 5)]
async fn main() {
    let registry = Registry::new();
    let strategy = registry
        .create_kind(StrategyKind::BulkJoinAll)
        .expect("bulk join is built in");

    for mode in [ExecutionMode::Blocking, ExecutionMode::NonBlocking] {
        let spec = BatchSpec::new(StrategyKind::BulkJoinAll)
            .units(16)
            .delay(Duration::from_millis(100))
            .mode(mode)
            .pool_capacity(4);

        let pool = WorkerPool::new(spec.capacity());
        let (outcome, elapsed) = instrumented(strategy.drive(spec.build_units(), pool.clone())).await;
        let outcome = outcome.expect("bulk join never halts");

        println!(
            "{mode:>12}: {} units in {elapsed:?}, peak {} of {} slots",
            outcome.results.len(),
            pool.peak_in_use(),
            pool.capacity(),
        );
    }
}
