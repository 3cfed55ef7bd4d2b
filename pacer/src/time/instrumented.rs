use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

/// Wraps a future and measures the wall-clock time it takes to complete.
///
/// The clock starts on the **first poll**, not at construction, so the
/// measurement covers exactly the time the future was being driven.
///
/// # Examples
///
/// ```rust,ignore
/// let (report, elapsed) = instrumented(strategy.drive(units, pool)).await;
/// ```
pub fn instrumented<F>(future: F) -> Instrumented<F> {
    Instrumented {
        future,
        start: None,
    }
}

/// Future returned by [`instrumented`]; resolves to `(output, elapsed)`.
pub struct Instrumented<F> {
    future: F,

    /// Instant of the first poll.
    start: Option<Instant>,
}

impl<F: Future> Future for Instrumented<F> {
    type Output = (F::Output, Duration);

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // Safety: `future` is never moved out of the pinned struct.
        let this = unsafe { self.get_unchecked_mut() };

        let start = *this.start.get_or_insert_with(Instant::now);

        let future = unsafe { Pin::new_unchecked(&mut this.future) };

        match future.poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(output) => Poll::Ready((output, start.elapsed())),
        }
    }
}
