use super::{BoxFuture, Halt, Outcome, Strategy, StrategyKind};
use crate::pool::WorkerPool;
use crate::unit::WorkUnit;

/// Runs one unit at a time, in index order, inside the driving task.
///
/// The first failing unit stops the batch; later units are never started.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl Strategy for Sequential {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Sequential
    }

    fn drive(
        &self,
        units: Vec<WorkUnit>,
        pool: WorkerPool,
    ) -> BoxFuture<'static, Result<Outcome, Halt>> {
        Box::pin(async move {
            let total = units.len();
            let mut completed = Vec::with_capacity(total);

            for (order, unit) in units.into_iter().enumerate() {
                let result = unit.run(&pool).await.ranked(order);

                if let Some(failure) = result.failure().cloned() {
                    completed.push(result);

                    return Err(Halt {
                        failure,
                        not_executed: total - completed.len(),
                        completed,
                    });
                }

                completed.push(result);
            }

            Ok(Outcome {
                results: completed,
                aggregate_error: None,
                detached: 0,
            })
        })
    }
}
