use super::JoinHandle;
use super::state::{COMPLETED, IDLE, NOTIFIED, QUEUED, RELEASED, RUNNING};
use crate::runtime::context::{CURRENT_INJECTOR, CURRENT_LOCALS, CURRENT_WORKER_ID};
use crate::runtime::task::waker::make_waker;
use crate::runtime::work_stealing::injector::Injector;

use std::cell::UnsafeCell;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::task::{Context, Poll, Waker};

/// Type-erased task the queues hold.
pub(crate) trait Runnable: Send + Sync {
    /// Polls the task once. Called by a worker thread.
    fn run(self: Arc<Self>);

    /// Drops the future of an unfinished task. Called at shutdown, once no
    /// worker is left to poll it.
    fn release(&self);
}

/// A spawned future together with its state, output slot and the wakers of
/// the join handles awaiting it.
pub(crate) struct Task<T> {
    /// `None` once the future has completed, so that everything it owns
    /// (pool slots included) is released as soon as it finishes.
    future: UnsafeCell<Option<Pin<Box<dyn Future<Output = T> + Send>>>>,

    pub(crate) result: UnsafeCell<Option<T>>,

    pub(crate) state: AtomicUsize,

    /// Injector the task is pushed back to when woken.
    injector: Arc<Injector>,

    pub(crate) waiters: Mutex<Vec<Waker>>,
}

// Safety: the future and result cells are only touched by the worker that
// moved the state to RUNNING, or by the join handle after COMPLETED.
unsafe impl<T> Send for Task<T> {}
unsafe impl<T> Sync for Task<T> {}

impl<T: Send + 'static> Task<T> {
    /// Creates a task in the `QUEUED` state, tracked by `injector` until
    /// it is dropped.
    pub(crate) fn new<F>(future: F, injector: Arc<Injector>) -> Arc<Self>
    where
        F: Future<Output = T> + Send + 'static,
    {
        let task = Arc::new(Self {
            future: UnsafeCell::new(Some(Box::pin(future))),
            result: UnsafeCell::new(None),
            state: AtomicUsize::new(QUEUED),
            injector: injector.clone(),
            waiters: Mutex::new(Vec::new()),
        });

        let tracked: Weak<Self> = Arc::downgrade(&task);
        injector.track(tracked);

        task
    }

    /// Polls the future once.
    ///
    /// - `Poll::Pending`: back to `IDLE`, or re-queued if woken meanwhile.
    /// - `Poll::Ready`: output stored, future dropped, join handles woken.
    pub(crate) fn run(self: Arc<Self>) {
        let current = self.state.load(Ordering::Acquire);

        if current != QUEUED && current != NOTIFIED {
            return;
        }

        // RUNNING grants exclusive access to the cells.
        if self
            .state
            .compare_exchange(current, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let waker = make_waker(self.clone());
        let mut cx = Context::from_waker(&waker);

        // Safety: the RUNNING state guarantees no other thread polls this future.
        let slot = unsafe { &mut *self.future.get() };
        let Some(future) = slot.as_mut() else {
            return;
        };

        match future.as_mut().poll(&mut cx) {
            Poll::Pending => {
                if self
                    .state
                    .compare_exchange(RUNNING, IDLE, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    // Woken while running.
                    self.state.store(QUEUED, Ordering::Release);
                    self.injector.push(self.clone());
                }
            }
            Poll::Ready(val) => {
                *slot = None;

                unsafe {
                    *self.result.get() = Some(val);
                }
                self.state.store(COMPLETED, Ordering::Release);

                let waiters = std::mem::take(
                    &mut *self
                        .waiters
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner()),
                );
                for w in waiters {
                    w.wake();
                }
            }
        }
    }

    /// Reschedules the task.
    ///
    /// `IDLE` moves to `QUEUED` and is pushed to the injector; `RUNNING`
    /// moves to `NOTIFIED` so the worker re-queues it after the current poll.
    pub(crate) fn schedule(self: &Arc<Self>) {
        loop {
            match self.state.load(Ordering::Acquire) {
                IDLE => {
                    if self
                        .state
                        .compare_exchange(IDLE, QUEUED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        self.injector.push(self.clone());
                        return;
                    }
                }
                RUNNING => {
                    if self
                        .state
                        .compare_exchange(RUNNING, NOTIFIED, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        return;
                    }
                }
                _ => return,
            }
        }
    }
}

impl<T: Send + 'static> Runnable for Task<T> {
    fn run(self: Arc<Self>) {
        Task::run(self)
    }

    /// Moves the task to `RELEASED` and drops its future and join waiters.
    ///
    /// `schedule` ignores `RELEASED`, so wake-ups fired by the future's own
    /// destructors are no-ops.
    fn release(&self) {
        let mut current = self.state.load(Ordering::Acquire);

        loop {
            if current == COMPLETED || current == RELEASED {
                return;
            }

            match self.state.compare_exchange(
                current,
                RELEASED,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => current = actual,
            }
        }

        // Safety: every worker has exited and RELEASED is never polled.
        let future = unsafe { (*self.future.get()).take() };
        drop(future);

        let waiters = std::mem::take(
            &mut *self
                .waiters
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        drop(waiters);
    }
}

/// Spawns a future onto the current runtime and returns its handle.
///
/// From a worker thread the task goes to that worker's local queue;
/// otherwise it goes to the global injector. Dropping the returned
/// [`JoinHandle`] detaches the task: it keeps running to completion.
///
/// # Panics
///
/// Panics if called outside the context of a running runtime.
pub fn spawn<F, T>(future: F) -> JoinHandle<T>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    let injector = CURRENT_INJECTOR.with(|cell| {
        cell.borrow()
            .as_ref()
            .expect("spawn must be called within the context of a runtime")
            .clone()
    });

    let task = Task::new(future, injector.clone());

    let pushed_locally = CURRENT_WORKER_ID.with(|id_cell| {
        let Some(id) = *id_cell.borrow() else {
            return false;
        };

        CURRENT_LOCALS.with(|locals_cell| match locals_cell.borrow().as_ref() {
            Some(locals) => {
                locals[id].push(task.clone());
                true
            }
            None => false,
        })
    });

    if !pushed_locally {
        injector.push(task.clone());
    }

    JoinHandle { task }
}
