use crate::reactor::ReactorHandle;
use crate::runtime::context::enter_context;
use crate::runtime::executor::worker::Worker;
use crate::runtime::task::Task;
use crate::runtime::work_stealing::injector::Injector;
use crate::runtime::work_stealing::queue::LocalQueue;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// Multi-threaded task executor.
///
/// The `Executor` owns the global injector, one local queue per worker and
/// the worker threads themselves. Workers are named `pacer-worker-{id}` so
/// that a thread occupied by a blocking unit is easy to spot in a debugger.
pub(crate) struct Executor {
    /// Global injector queue shared by all workers.
    injector: Arc<Injector>,

    /// Local queues, indexed by worker id.
    locals: Arc<Vec<Arc<LocalQueue>>>,

    /// Join handles for worker threads.
    handles: Vec<JoinHandle<()>>,

    /// Shutdown flag shared with all workers.
    shutdown: Arc<AtomicBool>,
}

impl Executor {
    /// Spawns `threads` workers sharing one injector.
    ///
    /// If a worker thread cannot be spawned, the ones already running are
    /// shut down and joined before the error is returned.
    pub(crate) fn new(reactor_handle: ReactorHandle, threads: usize) -> io::Result<Self> {
        let injector = Arc::new(Injector::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let locals: Arc<Vec<Arc<LocalQueue>>> =
            Arc::new((0..threads).map(|_| Arc::new(LocalQueue::new())).collect());

        let mut executor = Self {
            injector,
            locals,
            handles: Vec::with_capacity(threads),
            shutdown,
        };

        for id in 0..threads {
            let worker = Worker::new(id, executor.locals.clone(), executor.injector.clone());

            let reactor = reactor_handle.clone();
            let sd = executor.shutdown.clone();
            let injector = executor.injector.clone();

            let spawned = thread::Builder::new()
                .name(format!("pacer-worker-{id}"))
                .spawn(move || {
                    enter_context(reactor.clone(), injector, || {
                        worker.run(sd, reactor);
                    });
                });

            match spawned {
                Ok(handle) => executor.handles.push(handle),
                Err(err) => {
                    executor.shutdown();
                    executor.join();
                    return Err(err);
                }
            }
        }

        Ok(executor)
    }

    /// Sets the shutdown flag and wakes every parked worker.
    pub(crate) fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.injector.shutdown();
    }

    /// Spawns a new task onto the global injector.
    ///
    /// Tasks spawned after shutdown has begun are silently ignored.
    pub(crate) fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.shutdown.load(Ordering::Acquire) {
            return;
        }

        let task = Task::new(future, self.injector.clone());
        self.injector.push(task);
    }

    /// Waits for all worker threads to terminate, then releases every task
    /// that did not finish.
    ///
    /// Unfinished tasks have their futures dropped and every queue is
    /// emptied, so that nothing they own outlives the executor.
    pub(crate) fn join(&mut self) {
        for h in self.handles.drain(..) {
            let _ = h.join();
        }

        let unfinished = self.injector.take_tracked();
        for task in &unfinished {
            task.release();
        }

        let mut drained = self.injector.drain();
        for local in self.locals.iter() {
            drained.extend(local.drain());
        }

        tracing::trace!(
            released = unfinished.len(),
            drained = drained.len(),
            "executor queues emptied"
        );
    }
}
