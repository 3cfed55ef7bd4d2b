//! The bounded worker pool units run against.
//!
//! A [`WorkerPool`] is a fixed arena of execution slots. A unit must hold a
//! slot while it occupies a worker:
//! - a blocking unit holds one for its whole delay,
//! - a non-blocking unit holds one only to start and to finish, and none
//!   while its timer is pending.
//!
//! Acquisition suspends the calling task (it never blocks a thread) until a
//! slot is free. Waiters are served in arrival order and a released slot is
//! handed directly to the oldest waiter, so no unit starves while capacity
//! exists. The slot state is the only mutable state shared between the
//! units of a batch; every operation on it happens under one lock.

mod arena;

pub use arena::SlotId;

use arena::SlotArena;

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll, Waker};

/// A fixed-capacity set of execution slots. Cloning shares the same slots.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    state: Mutex<PoolState>,
}

struct PoolState {
    slots: SlotArena,

    /// High-water mark of occupied slots.
    peak_in_use: usize,

    /// Tickets of waiting acquirers, oldest first.
    queue: VecDeque<u64>,

    parked: HashMap<u64, Parked>,

    next_ticket: u64,
}

struct Parked {
    waker: Waker,

    /// Slot handed over by a releasing holder, not yet picked up.
    granted: Option<SlotId>,
}

impl PoolInner {
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PoolState {
    /// Gives `slot` to the oldest live waiter, or back to the arena.
    /// Returns the waker to call once the lock is released.
    fn release(&mut self, slot: SlotId) -> Option<Waker> {
        while let Some(ticket) = self.queue.pop_front() {
            if let Some(parked) = self.parked.get_mut(&ticket) {
                parked.granted = Some(slot);
                return Some(parked.waker.clone());
            }
        }

        self.slots.put(slot);
        None
    }

    fn record_take(&mut self) {
        self.peak_in_use = self.peak_in_use.max(self.slots.in_use());
    }
}

impl WorkerPool {
    /// Creates a pool of `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "pool capacity must be > 0");

        Self {
            inner: Arc::new(PoolInner {
                state: Mutex::new(PoolState {
                    slots: SlotArena::new(capacity),
                    peak_in_use: 0,
                    queue: VecDeque::new(),
                    parked: HashMap::new(),
                    next_ticket: 0,
                }),
            }),
        }
    }

    /// Number of slots; fixed for the lifetime of the pool.
    pub fn capacity(&self) -> usize {
        self.inner.lock().slots.capacity()
    }

    /// Slots currently held (including ones handed to a waiter that has not
    /// resumed yet).
    pub fn in_use(&self) -> usize {
        self.inner.lock().slots.in_use()
    }

    /// Largest number of slots ever held at once.
    pub fn peak_in_use(&self) -> usize {
        self.inner.lock().peak_in_use
    }

    /// Number of acquirers currently suspended waiting for a slot.
    pub fn waiting(&self) -> usize {
        self.inner.lock().parked.len()
    }

    /// Waits for a free slot.
    ///
    /// The returned future resolves to a [`SlotGuard`]; dropping the guard
    /// releases the slot. Dropping the future before it resolves withdraws
    /// from the queue (and passes on a slot that was already handed to it).
    pub fn acquire(&self) -> Acquire {
        Acquire {
            inner: self.inner.clone(),
            ticket: None,
        }
    }

    /// Takes a free slot without waiting. Fails if the pool is exhausted or
    /// other acquirers are already queued.
    pub fn try_acquire(&self) -> Option<SlotGuard> {
        let mut state = self.inner.lock();

        if !state.queue.is_empty() {
            return None;
        }

        let slot = state.slots.take()?;
        state.record_take();

        Some(SlotGuard {
            inner: self.inner.clone(),
            slot,
        })
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();

        f.debug_struct("WorkerPool")
            .field("capacity", &state.slots.capacity())
            .field("in_use", &state.slots.in_use())
            .field("peak_in_use", &state.peak_in_use)
            .field("waiting", &state.parked.len())
            .finish()
    }
}

/// Future returned by [`WorkerPool::acquire`].
pub struct Acquire {
    inner: Arc<PoolInner>,

    /// Set once the acquirer has joined the wait queue.
    ticket: Option<u64>,
}

impl Future for Acquire {
    type Output = SlotGuard;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<SlotGuard> {
        let this = self.get_mut();
        let mut state = this.inner.lock();

        let Some(ticket) = this.ticket else {
            // Fast path only when nobody is queued, so late arrivals do not
            // overtake waiters.
            if state.queue.is_empty() {
                if let Some(slot) = state.slots.take() {
                    state.record_take();
                    tracing::trace!(slot = slot.index(), "slot acquired");

                    drop(state);
                    return Poll::Ready(SlotGuard {
                        inner: this.inner.clone(),
                        slot,
                    });
                }
            }

            let ticket = state.next_ticket;
            state.next_ticket += 1;
            state.queue.push_back(ticket);
            state.parked.insert(
                ticket,
                Parked {
                    waker: cx.waker().clone(),
                    granted: None,
                },
            );
            this.ticket = Some(ticket);

            return Poll::Pending;
        };

        let granted = match state.parked.get_mut(&ticket) {
            Some(parked) => match parked.granted {
                Some(slot) => Some(slot),
                None => {
                    if !parked.waker.will_wake(cx.waker()) {
                        parked.waker = cx.waker().clone();
                    }
                    None
                }
            },
            None => None,
        };

        match granted {
            Some(slot) => {
                state.parked.remove(&ticket);
                this.ticket = None;
                tracing::trace!(slot = slot.index(), "slot handed over");

                drop(state);
                Poll::Ready(SlotGuard {
                    inner: this.inner.clone(),
                    slot,
                })
            }
            None => Poll::Pending,
        }
    }
}

impl Drop for Acquire {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };

        let waker = {
            let mut state = self.inner.lock();
            state.queue.retain(|queued| *queued != ticket);

            match state.parked.remove(&ticket).and_then(|parked| parked.granted) {
                Some(slot) => state.release(slot),
                None => None,
            }
        };

        if let Some(waker) = waker {
            waker.wake();
        }
    }
}

/// An occupied slot. Released (or handed to the next waiter) on drop.
pub struct SlotGuard {
    inner: Arc<PoolInner>,
    slot: SlotId,
}

impl SlotGuard {
    pub fn slot(&self) -> SlotId {
        self.slot
    }
}

impl fmt::Debug for SlotGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SlotGuard").field(&self.slot).finish()
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let waker = self.inner.lock().release(self.slot);

        tracing::trace!(slot = self.slot.index(), handed_over = waker.is_some(), "slot released");

        if let Some(waker) = waker {
            waker.wake();
        }
    }
}
