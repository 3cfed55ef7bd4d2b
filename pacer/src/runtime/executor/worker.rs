use crate::reactor::ReactorHandle;
use crate::runtime::context::{CURRENT_LOCALS, CURRENT_WORKER_ID, enter_context};
use crate::runtime::task::Runnable;
use crate::runtime::work_stealing::injector::InjectorHandle;
use crate::runtime::work_stealing::queue::LocalQueue;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A worker thread in the executor.
///
/// The lookup order for the next task is:
/// 1. the worker's own local queue (LIFO),
/// 2. the global injector,
/// 3. another worker's local queue (FIFO steal),
/// 4. park until work is pushed or the park times out.
///
/// A worker that polls a blocking unit stays inside that poll for the
/// unit's whole delay; its queued tasks remain stealable by its peers.
pub(crate) struct Worker {
    id: usize,

    /// All local queues, indexed by worker id.
    locals: Arc<Vec<Arc<LocalQueue>>>,

    injector: InjectorHandle,
}

impl Worker {
    pub(crate) fn new(
        id: usize,
        locals: Arc<Vec<Arc<LocalQueue>>>,
        injector: InjectorHandle,
    ) -> Self {
        Self {
            id,
            locals,
            injector,
        }
    }

    /// Runs the worker loop until `shutdown` is observed.
    pub(crate) fn run(&self, shutdown: Arc<AtomicBool>, reactor: ReactorHandle) {
        CURRENT_WORKER_ID.with(|id| *id.borrow_mut() = Some(self.id));
        CURRENT_LOCALS.with(|locals| *locals.borrow_mut() = Some(self.locals.clone()));

        loop {
            if shutdown.load(Ordering::Acquire) {
                break;
            }

            let next = self.locals[self.id]
                .pop()
                .or_else(|| self.injector.steal())
                .or_else(|| self.try_steal());

            match next {
                Some(task) => enter_context(reactor.clone(), self.injector.clone(), || {
                    task.run();
                }),
                None => self.injector.park(),
            }
        }

        CURRENT_LOCALS.with(|locals| locals.borrow_mut().take());
        CURRENT_WORKER_ID.with(|id| id.borrow_mut().take());
    }

    /// Steals from the other workers' queues, round-robin starting after
    /// this worker's own id.
    fn try_steal(&self) -> Option<Arc<dyn Runnable>> {
        let len = self.locals.len();

        if len <= 1 {
            return None;
        }

        (1..len)
            .map(|offset| (self.id + offset) % len)
            .find_map(|victim| self.locals[victim].steal())
    }
}
