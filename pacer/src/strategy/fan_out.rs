use super::{BoxFuture, Halt, Outcome, Strategy, StrategyKind};
use crate::pool::WorkerPool;
use crate::task;
use crate::unit::WorkUnit;

/// Spawns every unit and returns without waiting for any of them.
///
/// The units keep running on the runtime; their results are never observed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelFanOut;

impl Strategy for ParallelFanOut {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ParallelFanOut
    }

    fn drive(
        &self,
        units: Vec<WorkUnit>,
        pool: WorkerPool,
    ) -> BoxFuture<'static, Result<Outcome, Halt>> {
        Box::pin(async move {
            let detached = units.len();

            for unit in units {
                let pool = pool.clone();

                // Dropping the handle detaches the task.
                let _ = task::spawn(async move {
                    unit.run(&pool).await;
                });
            }

            Ok(Outcome {
                results: Vec::new(),
                aggregate_error: None,
                detached,
            })
        })
    }
}
