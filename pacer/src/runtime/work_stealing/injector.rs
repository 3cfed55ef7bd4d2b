use crate::runtime::task::Runnable;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};
use std::time::Duration;

/// Shared handle to the global task injector.
pub(crate) type InjectorHandle = Arc<Injector>;

/// Upper bound on how long an idle worker sleeps before re-scanning the
/// local queues, which are pushed to without notifying anyone.
const PARK_TIMEOUT: Duration = Duration::from_millis(1);

/// Minimum length of the tracked-task list before dead entries are pruned.
const PRUNE_THRESHOLD: usize = 1024;

/// Global task queue of the executor.
///
/// Spawned tasks from outside a worker and every woken task are pushed here.
/// The injector also owns the condition variable idle workers park on, and
/// keeps a weak list of every task spawned through it so that shutdown can
/// reach tasks no queue holds.
pub(crate) struct Injector {
    queue: Mutex<VecDeque<Arc<dyn Runnable>>>,

    condvar: Condvar,

    shutdown: AtomicBool,

    tracked: Mutex<Tracked>,
}

struct Tracked {
    tasks: Vec<Weak<dyn Runnable>>,

    /// Length at which finished tasks are next pruned from `tasks`.
    prune_at: usize,
}

impl Injector {
    pub(crate) fn new() -> Self {
        Injector {
            queue: Mutex::new(VecDeque::new()),
            condvar: Condvar::new(),
            shutdown: AtomicBool::new(false),
            tracked: Mutex::new(Tracked {
                tasks: Vec::new(),
                prune_at: PRUNE_THRESHOLD,
            }),
        }
    }

    /// Signals shutdown and wakes all parked workers.
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.condvar.notify_all();
    }

    /// Pushes a task and wakes one parked worker.
    ///
    /// Once shutdown has begun no worker will pop the task again, so it is
    /// dropped instead of queued.
    pub(crate) fn push(&self, task: Arc<dyn Runnable>) {
        let mut queue = self.lock();

        if self.shutdown.load(Ordering::Acquire) {
            // The task may own the last reference to a future whose drop
            // pushes again; release the lock first.
            drop(queue);
            drop(task);
            return;
        }

        queue.push_back(task);
        drop(queue);

        self.condvar.notify_one();
    }

    /// Parks the calling worker until a task is pushed, shutdown begins, or
    /// [`PARK_TIMEOUT`] elapses.
    pub(crate) fn park(&self) {
        if self.shutdown.load(Ordering::Acquire) {
            return;
        }

        let queue = self.lock();

        if !queue.is_empty() {
            return;
        }

        let _ = self.condvar.wait_timeout(queue, PARK_TIMEOUT);
    }

    /// Takes the oldest task from the global queue.
    pub(crate) fn steal(&self) -> Option<Arc<dyn Runnable>> {
        self.lock().pop_front()
    }

    /// Empties the global queue.
    pub(crate) fn drain(&self) -> Vec<Arc<dyn Runnable>> {
        self.lock().drain(..).collect()
    }

    /// Records a newly spawned task.
    pub(crate) fn track(&self, task: Weak<dyn Runnable>) {
        let mut tracked = self
            .tracked
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if tracked.tasks.len() >= tracked.prune_at {
            tracked.tasks.retain(|task| task.strong_count() > 0);
            tracked.prune_at = (tracked.tasks.len() * 2).max(PRUNE_THRESHOLD);
        }

        tracked.tasks.push(task);
    }

    /// Takes every tracked task that is still alive.
    pub(crate) fn take_tracked(&self) -> Vec<Arc<dyn Runnable>> {
        let tasks = std::mem::take(
            &mut self
                .tracked
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .tasks,
        );

        tasks.iter().filter_map(Weak::upgrade).collect()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Arc<dyn Runnable>>> {
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
