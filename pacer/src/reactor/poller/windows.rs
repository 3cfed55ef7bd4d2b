//! Windows backend: an auto-reset event object.

use super::timeout_millis;

use std::io;
use std::ptr;
use std::sync::Arc;
use std::time::Duration;

use windows_sys::Win32::Foundation::{CloseHandle, HANDLE, WAIT_FAILED};
use windows_sys::Win32::System::Threading::{
    CreateEventW, INFINITE, SetEvent, WaitForSingleObject,
};

pub(crate) struct EventWaker(HANDLE);

// Safety: an event handle may be signalled and waited on from any thread.
unsafe impl Send for EventWaker {}
unsafe impl Sync for EventWaker {}

impl EventWaker {
    pub(crate) fn wake(&self) {
        unsafe {
            SetEvent(self.0);
        }
    }
}

impl Drop for EventWaker {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.0);
        }
    }
}

pub(crate) struct EventPoller {
    waker: Arc<EventWaker>,
}

impl EventPoller {
    pub(crate) fn new() -> io::Result<Self> {
        let handle = unsafe { CreateEventW(ptr::null(), 0, 0, ptr::null()) };

        if handle.is_null() {
            return Err(io::Error::last_os_error());
        }

        Ok(Self {
            waker: Arc::new(EventWaker(handle)),
        })
    }

    pub(crate) fn waker(&self) -> Arc<EventWaker> {
        self.waker.clone()
    }

    /// Blocks until the event is signalled or `timeout` elapses.
    pub(crate) fn wait(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        let timeout_ms = timeout_millis(timeout, INFINITE as i64) as u32;

        let rc = unsafe { WaitForSingleObject(self.waker.0, timeout_ms) };

        if rc == WAIT_FAILED {
            return Err(io::Error::last_os_error());
        }

        Ok(())
    }
}
