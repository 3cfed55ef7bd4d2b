//! OS wait primitive behind the reactor.
//!
//! A poller does exactly two things: block the reactor thread for at most a
//! given timeout, and let any other thread interrupt that wait. The backend
//! is selected at compile time:
//!
//! - Linux: `epoll` with an `eventfd` wake source,
//! - other Unix: `poll(2)` on a self-pipe,
//! - Windows: an auto-reset event object.

#[cfg(target_os = "linux")]
mod epoll;

#[cfg(all(unix, not(target_os = "linux")))]
mod pipe;

#[cfg(windows)]
mod windows;

#[cfg(target_os = "linux")]
pub(crate) use epoll::{EpollPoller as Poller, EventFdWaker as PollerWaker};

#[cfg(all(unix, not(target_os = "linux")))]
pub(crate) use pipe::{PipePoller as Poller, PipeWaker as PollerWaker};

#[cfg(windows)]
pub(crate) use windows::{EventPoller as Poller, EventWaker as PollerWaker};

use std::time::Duration;

/// Converts an optional timeout into whole milliseconds for the OS call,
/// rounding up so that a sub-millisecond remainder does not turn into a
/// busy loop. `None` maps to `infinite`.
pub(crate) fn timeout_millis(timeout: Option<Duration>, infinite: i64) -> i64 {
    match timeout {
        None => infinite,
        Some(t) => {
            let millis = t.as_nanos().div_ceil(1_000_000);
            millis.min(i32::MAX as u128) as i64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::timeout_millis;
    use std::time::Duration;

    #[test]
    fn sub_millisecond_timeouts_round_up() {
        assert_eq!(timeout_millis(Some(Duration::from_micros(1)), -1), 1);
        assert_eq!(timeout_millis(Some(Duration::from_micros(1500)), -1), 2);
        assert_eq!(timeout_millis(Some(Duration::ZERO), -1), 0);
    }

    #[test]
    fn missing_timeout_waits_forever() {
        assert_eq!(timeout_millis(None, -1), -1);
    }

    #[test]
    fn huge_timeouts_are_clamped() {
        let huge = Some(Duration::from_secs(u64::MAX / 4));
        assert_eq!(timeout_millis(huge, -1), i32::MAX as i64);
    }
}
