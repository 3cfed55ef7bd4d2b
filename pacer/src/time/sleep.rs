use crate::reactor::command::Command;
use crate::runtime::context::with_reactor;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

/// Creates a future that completes once `duration` has elapsed.
///
/// The deadline is fixed when `sleep` is called, not when the future is
/// first polled. While pending, the task holds no executor thread: the
/// reactor keeps its waker until the deadline passes.
///
/// # Panics
///
/// Panics if a non-elapsed sleep is polled outside of a running runtime.
///
/// # Examples
///
/// ```rust,ignore
/// use std::time::Duration;
///
/// sleep(Duration::from_millis(10)).await;
/// ```
pub fn sleep(duration: Duration) -> Sleep {
    Sleep {
        deadline: Instant::now() + duration,
        registered: false,
        cancelled: Arc::new(AtomicBool::new(false)),
    }
}

/// Future returned by [`sleep`].
///
/// Dropping it before it fires cancels the timer.
pub struct Sleep {
    deadline: Instant,

    /// Whether the timer has been handed to the reactor.
    registered: bool,

    /// Shared with the reactor's timer entry.
    cancelled: Arc<AtomicBool>,
}

impl Sleep {
    /// The instant at which this sleep completes.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if Instant::now() >= this.deadline {
            return Poll::Ready(());
        }

        if !this.registered {
            this.registered = true;

            with_reactor("Sleep polled", |reactor| {
                let _ = reactor.send(Command::SetTimer {
                    deadline: this.deadline,
                    waker: cx.waker().clone(),
                    cancelled: this.cancelled.clone(),
                });
            });
        }

        Poll::Pending
    }
}

impl Drop for Sleep {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
    }
}
