//! Lifecycle states of a spawned task, stored in `Task::state`.
//!
//! There is no cancelled state: once spawned, a task always runs to
//! completion, whether or not anyone still holds its join handle. The one
//! exception is runtime shutdown, which releases unfinished tasks.

/// Not queued and not running; waiting for a wake-up.
pub(crate) const IDLE: usize = 0;

/// Sitting in a run queue.
pub(crate) const QUEUED: usize = 1;

/// Being polled by exactly one worker.
pub(crate) const RUNNING: usize = 2;

/// The future returned `Poll::Ready`; the output is stored.
pub(crate) const COMPLETED: usize = 3;

/// Woken while running; re-queued as soon as the current poll returns.
pub(crate) const NOTIFIED: usize = 4;

/// Its runtime shut down before it finished; the future has been dropped
/// and the task is never polled or re-queued again.
pub(crate) const RELEASED: usize = 5;
