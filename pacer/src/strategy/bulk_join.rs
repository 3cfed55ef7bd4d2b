use super::{BoxFuture, Halt, Outcome, Strategy, StrategyKind};
use crate::aggregate::{AggregationPolicy, ExceptionAggregator, Verdict};
use crate::pool::WorkerPool;
use crate::task::JoinSet;
use crate::unit::WorkUnit;

/// Spawns every unit into a [`JoinSet`] and collects completions in the
/// order they happen.
///
/// With [`AggregationPolicy::CollectAll`] it waits for every unit. With
/// [`AggregationPolicy::FirstOnly`] it stops waiting at the first failure
/// and detaches the rest, which keep running.
#[derive(Debug, Clone, Copy)]
pub struct BulkJoin {
    policy: AggregationPolicy,
}

impl BulkJoin {
    pub fn new(policy: AggregationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> AggregationPolicy {
        self.policy
    }
}

impl Strategy for BulkJoin {
    fn kind(&self) -> StrategyKind {
        match self.policy {
            AggregationPolicy::CollectAll => StrategyKind::BulkJoinAll,
            AggregationPolicy::FirstOnly => StrategyKind::BulkJoinFailFast,
        }
    }

    fn drive(
        &self,
        units: Vec<WorkUnit>,
        pool: WorkerPool,
    ) -> BoxFuture<'static, Result<Outcome, Halt>> {
        let policy = self.policy;

        Box::pin(async move {
            let mut set = JoinSet::new();

            for unit in units {
                let pool = pool.clone();
                set.spawn(async move { unit.run(&pool).await });
            }

            let mut aggregator = ExceptionAggregator::new(policy);
            let mut results = Vec::with_capacity(set.len());

            while let Some(completed) = set.join_next().await {
                let result = completed.value.ranked(completed.order);
                let verdict = aggregator.observe(&result);
                results.push(result);

                if verdict == Verdict::Stop {
                    break;
                }
            }

            let detached = set.detach();

            Ok(Outcome {
                results,
                aggregate_error: aggregator.finish(),
                detached,
            })
        })
    }
}
