use crate::task::Task;
use crate::task::state::COMPLETED;

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::task::{Context, Poll};

/// A handle to a spawned task.
///
/// Awaiting the handle yields the task's output. Dropping it does **not**
/// stop the task; it only gives up the ability to observe the result.
///
/// A task released by its runtime's shutdown has no output, and a handle to
/// it stays pending.
pub struct JoinHandle<T> {
    pub(crate) task: Arc<Task<T>>,
}

impl<T> JoinHandle<T> {
    /// Returns `true` once the task's future has completed.
    pub fn is_finished(&self) -> bool {
        self.task.state.load(Ordering::Acquire) == COMPLETED
    }

    fn take_output(&self) -> T {
        // Safety: COMPLETED was observed, so the worker no longer touches the cell.
        unsafe {
            (*self.task.result.get())
                .take()
                .expect("result already taken")
        }
    }
}

impl<T> Future for JoinHandle<T> {
    type Output = T;

    /// The waker is registered before re-checking the state so that a
    /// completion racing with this poll is not missed.
    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        if self.is_finished() {
            return Poll::Ready(self.take_output());
        }

        self.task
            .waiters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(cx.waker().clone());

        if self.is_finished() {
            return Poll::Ready(self.take_output());
        }

        Poll::Pending
    }
}
