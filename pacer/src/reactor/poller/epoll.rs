//! Linux backend: `epoll` with a single registered `eventfd`.
//!
//! The reactor never registers I/O descriptors, so the only event this
//! epoll instance can report is the wake-up eventfd becoming readable.

use super::timeout_millis;

use libc::{
    EFD_CLOEXEC, EFD_NONBLOCK, EPOLL_CLOEXEC, EPOLL_CTL_ADD, EPOLLIN, epoll_create1, epoll_ctl,
    epoll_event, epoll_wait, eventfd,
};
use std::io;
use std::os::fd::RawFd;
use std::sync::Arc;
use std::time::Duration;

/// Token stored in the eventfd's epoll registration.
const WAKE_TOKEN: u64 = u64::MAX;

/// Interrupts [`EpollPoller::wait`] from any thread.
pub(crate) struct EventFdWaker(RawFd);

impl EventFdWaker {
    pub(crate) fn wake(&self) {
        let buf: u64 = 1;
        // A full counter (EAGAIN) still leaves the fd readable, which is all we need.
        unsafe {
            libc::write(self.0, &buf as *const u64 as *const _, 8);
        }
    }

    fn drain(&self) {
        let mut buf = 0u64;
        unsafe {
            libc::read(self.0, &mut buf as *mut u64 as *mut _, 8);
        }
    }
}

impl Drop for EventFdWaker {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.0);
        }
    }
}

pub(crate) struct EpollPoller {
    epoll: RawFd,
    waker: Arc<EventFdWaker>,
}

impl EpollPoller {
    /// Creates the epoll instance and registers a non-blocking eventfd in it.
    pub(crate) fn new() -> io::Result<Self> {
        let epoll = unsafe { epoll_create1(EPOLL_CLOEXEC) };
        if epoll < 0 {
            return Err(io::Error::last_os_error());
        }

        let fd = unsafe { eventfd(0, EFD_NONBLOCK | EFD_CLOEXEC) };
        if fd < 0 {
            let err = io::Error::last_os_error();
            unsafe { libc::close(epoll) };
            return Err(err);
        }

        let waker = Arc::new(EventFdWaker(fd));

        let mut event = epoll_event {
            events: EPOLLIN as u32,
            u64: WAKE_TOKEN,
        };

        let rc = unsafe { epoll_ctl(epoll, EPOLL_CTL_ADD, fd, &mut event) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            unsafe { libc::close(epoll) };
            return Err(err);
        }

        Ok(Self { epoll, waker })
    }

    pub(crate) fn waker(&self) -> Arc<EventFdWaker> {
        self.waker.clone()
    }

    /// Blocks until woken or until `timeout` elapses (`None` waits forever).
    pub(crate) fn wait(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        let mut event = epoll_event { events: 0, u64: 0 };
        let timeout_ms = timeout_millis(timeout, -1) as i32;

        let n = unsafe { epoll_wait(self.epoll, &mut event, 1, timeout_ms) };

        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(());
            }
            return Err(err);
        }

        if n > 0 && event.u64 == WAKE_TOKEN {
            self.waker.drain();
        }

        Ok(())
    }
}

impl Drop for EpollPoller {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.epoll);
        }
    }
}
