use crate::runtime::task::Task;

use std::sync::Arc;
use std::task::{Wake, Waker};

/// Waking a task reschedules it through its injector.
impl<T: Send + 'static> Wake for Task<T> {
    fn wake(self: Arc<Self>) {
        self.schedule();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.schedule();
    }
}

/// Creates the [`Waker`] handed to a task's future while it is polled.
///
/// The waker holds a strong reference to the task, so a timer or pool
/// waiter list keeps a suspended task alive until it is woken.
pub(crate) fn make_waker<T: Send + 'static>(task: Arc<Task<T>>) -> Waker {
    Waker::from(task)
}
