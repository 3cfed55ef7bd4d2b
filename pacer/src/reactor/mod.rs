//! Timer reactor.
//!
//! The reactor is a dedicated thread that owns every pending timer of a
//! runtime. `sleep` futures register a deadline and a waker with it; the
//! reactor sleeps on an OS wait primitive until the earliest deadline (or
//! until a new command arrives) and wakes the tasks whose deadlines passed.
//!
//! This is what lets a non-blocking unit wait without occupying an executor
//! worker: while its timer is pending the task is parked here, not on a
//! thread.

mod core;
mod poller;
mod timer;

pub(crate) mod command;

pub(crate) use self::core::{Reactor, ReactorHandle};
