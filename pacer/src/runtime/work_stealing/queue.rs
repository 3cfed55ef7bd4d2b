use crate::runtime::task::Runnable;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A per-worker local task queue.
///
/// The owner pushes and pops at the back; peers steal from the front.
pub(crate) struct LocalQueue {
    inner: Mutex<VecDeque<Arc<dyn Runnable>>>,
}

impl LocalQueue {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn push(&self, task: Arc<dyn Runnable>) {
        self.lock().push_back(task);
    }

    pub(crate) fn pop(&self) -> Option<Arc<dyn Runnable>> {
        self.lock().pop_back()
    }

    pub(crate) fn steal(&self) -> Option<Arc<dyn Runnable>> {
        self.lock().pop_front()
    }

    pub(crate) fn drain(&self) -> Vec<Arc<dyn Runnable>> {
        self.lock().drain(..).collect()
    }

    /// A panicking task never holds this lock, so a poisoned guard is still
    /// structurally sound.
    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Arc<dyn Runnable>>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
