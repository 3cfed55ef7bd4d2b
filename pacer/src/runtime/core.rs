use std::future::Future;
use std::io;
use std::sync::mpsc;

use super::executor::core::Executor;
use crate::reactor::command::Command;
use crate::reactor::{Reactor, ReactorHandle};

/// The executor runtime a batch runs on.
///
/// `Runtime` owns:
/// - the worker threads that poll tasks,
/// - the reactor thread that fires timers for non-blocking delays.
///
/// Dropping the runtime stops both. Worker threads that are blocked inside a
/// blocking unit are joined once that unit's delay has elapsed. Tasks that
/// have not finished by then (suspended on a timer or waiting for a pool
/// slot) are released: their futures are dropped along with everything they
/// own.
pub struct Runtime {
    /// Task executor responsible for scheduling and running futures.
    executor: Executor,

    /// Handle to the reactor thread.
    reactor_handle: ReactorHandle,

    /// Number of worker threads the executor was started with.
    worker_threads: usize,
}

impl Runtime {
    /// Starts the reactor, then an executor with `worker_threads` workers.
    pub(crate) fn new(worker_threads: usize) -> io::Result<Self> {
        let reactor_handle = Reactor::start()?;
        let executor = Executor::new(reactor_handle.clone(), worker_threads)?;

        tracing::debug!(worker_threads, "runtime started");

        Ok(Self {
            executor,
            reactor_handle,
            worker_threads,
        })
    }

    /// Number of executor worker threads.
    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    /// Spawns a detached future onto the runtime.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.executor.spawn(future);
    }

    /// Runs a future to completion, blocking the current thread.
    ///
    /// The future is spawned onto the executor and its output is sent back
    /// through a channel, so it always runs on a worker thread.
    ///
    /// # Panics
    ///
    /// Panics if the runtime shuts down before the future completes.
    pub fn block_on<F>(&self, future: F) -> F::Output
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let (transmitter, receiver) = mpsc::channel();

        self.spawn(async move {
            let result = future.await;
            let _ = transmitter.send(result);
        });

        receiver.recv().expect("block_on failed")
    }
}

impl Drop for Runtime {
    /// Stops task submission, shuts the reactor down, then joins the workers.
    fn drop(&mut self) {
        self.executor.shutdown();

        let _ = self.reactor_handle.send(Command::Shutdown);

        self.executor.join();

        tracing::debug!(worker_threads = self.worker_threads, "runtime stopped");
    }
}
