use super::Runtime;

use std::io;
use std::thread;

/// Builder for configuring and creating a [`Runtime`].
///
/// The only knob is the number of executor worker threads. The harness
/// sizes it so that every pool slot can block a thread while the batch
/// driver still has one to make progress on.
///
/// # Examples
///
/// ```rust,ignore
/// let runtime = RuntimeBuilder::new()
///     .worker_threads(4)
///     .build()?;
/// ```
pub struct RuntimeBuilder {
    /// Number of worker threads in the executor.
    worker_threads: usize,
}

impl RuntimeBuilder {
    /// Creates a builder sized to the number of logical CPUs, falling back
    /// to `1` if that cannot be determined.
    pub fn new() -> Self {
        let worker_threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self { worker_threads }
    }

    /// Sets the number of worker threads used by the runtime.
    ///
    /// # Panics
    ///
    /// Panics if `n == 0`.
    pub fn worker_threads(mut self, n: usize) -> Self {
        assert!(n > 0, "worker_threads must be > 0");

        self.worker_threads = n;
        self
    }

    /// Returns the configured number of worker threads.
    pub fn threads(&self) -> usize {
        self.worker_threads
    }

    /// Starts the timer reactor and the executor.
    ///
    /// # Errors
    ///
    /// Fails if the reactor's OS wake-up primitive or one of the threads
    /// cannot be created.
    pub fn build(self) -> io::Result<Runtime> {
        Runtime::new(self.worker_threads)
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
