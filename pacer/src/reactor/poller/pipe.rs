//! Portable Unix backend: `poll(2)` on the read end of a self-pipe.

use super::timeout_millis;

use libc::{F_GETFL, F_SETFD, F_SETFL, FD_CLOEXEC, O_NONBLOCK, POLLIN, fcntl, pipe, poll, pollfd};
use std::io;
use std::os::fd::RawFd;
use std::sync::Arc;
use std::time::Duration;

/// Write end of the self-pipe.
pub(crate) struct PipeWaker(RawFd);

impl PipeWaker {
    pub(crate) fn wake(&self) {
        let byte = 1u8;
        // A full pipe (EAGAIN) already guarantees the reader wakes up.
        unsafe {
            libc::write(self.0, &byte as *const u8 as *const _, 1);
        }
    }
}

impl Drop for PipeWaker {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.0);
        }
    }
}

pub(crate) struct PipePoller {
    read_fd: RawFd,
    waker: Arc<PipeWaker>,
}

fn set_nonblocking_cloexec(fd: RawFd) -> io::Result<()> {
    let flags = unsafe { fcntl(fd, F_GETFL) };
    if flags < 0 || unsafe { fcntl(fd, F_SETFL, flags | O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }

    if unsafe { fcntl(fd, F_SETFD, FD_CLOEXEC) } < 0 {
        return Err(io::Error::last_os_error());
    }

    Ok(())
}

impl PipePoller {
    pub(crate) fn new() -> io::Result<Self> {
        let mut fds = [0 as RawFd; 2];

        if unsafe { pipe(fds.as_mut_ptr()) } < 0 {
            return Err(io::Error::last_os_error());
        }

        let [read_fd, write_fd] = fds;
        let poller = Self {
            read_fd,
            waker: Arc::new(PipeWaker(write_fd)),
        };

        set_nonblocking_cloexec(read_fd)?;
        set_nonblocking_cloexec(write_fd)?;

        Ok(poller)
    }

    pub(crate) fn waker(&self) -> Arc<PipeWaker> {
        self.waker.clone()
    }

    /// Blocks until woken or until `timeout` elapses (`None` waits forever).
    pub(crate) fn wait(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        let mut fd = pollfd {
            fd: self.read_fd,
            events: POLLIN,
            revents: 0,
        };

        let timeout_ms = timeout_millis(timeout, -1) as i32;
        let n = unsafe { poll(&mut fd, 1, timeout_ms) };

        if n < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(());
            }
            return Err(err);
        }

        if n > 0 {
            let mut buf = [0u8; 64];
            while unsafe { libc::read(self.read_fd, buf.as_mut_ptr() as *mut _, buf.len()) } > 0 {}
        }

        Ok(())
    }
}

impl Drop for PipePoller {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.read_fd);
        }
    }
}
