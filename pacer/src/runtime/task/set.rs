use std::collections::VecDeque;
use std::future::poll_fn;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Poll, Waker};

use crate::task;

/// An output of a [`JoinSet`] task, stamped with its completion rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed<T> {
    /// Zero-based rank of this completion within the set. Assigned when the
    /// task finishes, not when it was spawned.
    pub order: usize,

    pub value: T,
}

/// A set of spawned tasks whose outputs are yielded in the order the tasks
/// **completed**.
///
/// Each spawned future is wrapped so that, when it finishes, its output is
/// appended to a shared queue and stamped with the next completion rank
/// under the same lock. [`join_next`](Self::join_next) therefore observes
/// completions in real completion order, regardless of spawn order or of
/// how the set happens to be polled.
///
/// A `JoinSet` never cancels anything: dropping it (or calling
/// [`detach`](Self::detach)) leaves the remaining tasks running to
/// completion; their outputs are simply discarded.
pub struct JoinSet<T> {
    shared: Arc<Completions<T>>,

    /// Spawned tasks whose output has not been handed out yet.
    outstanding: usize,
}

struct Completions<T> {
    state: Mutex<CompletionState<T>>,
}

struct CompletionState<T> {
    ready: VecDeque<Completed<T>>,
    next_order: usize,
    waker: Option<Waker>,
}

impl<T> Completions<T> {
    fn lock(&self) -> MutexGuard<'_, CompletionState<T>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn complete(&self, value: T) {
        let waker = {
            let mut state = self.lock();
            let order = state.next_order;
            state.next_order += 1;
            state.ready.push_back(Completed { order, value });
            state.waker.take()
        };

        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

impl<T: Send + 'static> JoinSet<T> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Completions {
                state: Mutex::new(CompletionState {
                    ready: VecDeque::new(),
                    next_order: 0,
                    waker: None,
                }),
            }),
            outstanding: 0,
        }
    }

    /// Spawns `fut` onto the current runtime as a member of this set.
    ///
    /// # Panics
    ///
    /// Panics if called outside the context of a running runtime.
    pub fn spawn<F>(&mut self, fut: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        let shared = self.shared.clone();

        // The handle is dropped on purpose: completion is reported through
        // the shared queue instead.
        let _ = task::spawn(async move {
            let value = fut.await;
            shared.complete(value);
        });

        self.outstanding += 1;
    }

    /// Number of spawned tasks whose output has not been joined yet, whether
    /// they are still running or already finished.
    pub fn len(&self) -> usize {
        self.outstanding
    }

    /// Returns `true` if every spawned task has been joined.
    pub fn is_empty(&self) -> bool {
        self.outstanding == 0
    }

    /// Waits for the next task to complete and returns its output.
    ///
    /// Returns `None` once every spawned task has been joined.
    pub async fn join_next(&mut self) -> Option<Completed<T>> {
        if self.outstanding == 0 {
            return None;
        }

        let completed = poll_fn(|cx| {
            let mut state = self.shared.lock();

            match state.ready.pop_front() {
                Some(completed) => Poll::Ready(completed),
                None => {
                    state.waker = Some(cx.waker().clone());
                    Poll::Pending
                }
            }
        })
        .await;

        self.outstanding -= 1;
        Some(completed)
    }

    /// Waits for every task and returns the outputs in completion order.
    pub async fn join_all(&mut self) -> Vec<Completed<T>> {
        let mut out = Vec::with_capacity(self.outstanding);

        while let Some(completed) = self.join_next().await {
            out.push(completed);
        }

        out
    }

    /// Stops observing the set and returns how many tasks were not joined.
    ///
    /// Those tasks keep running on the runtime.
    pub fn detach(self) -> usize {
        self.outstanding
    }
}

impl<T: Send + 'static> Default for JoinSet<T> {
    fn default() -> Self {
        Self::new()
    }
}
