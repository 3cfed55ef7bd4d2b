//! Asynchronous task primitives.
//!
//! - [`spawn`] and [`JoinHandle`] for single tasks,
//! - [`JoinSet`] for fan-out/fan-in with completion-ordered results.
//!
//! Nothing in this module cancels a task. A task runs to completion once
//! spawned; handles and sets only decide whether its output is observed.

pub(crate) mod handle;
pub(crate) mod set;
pub(crate) mod state;
pub(crate) mod waker;

pub(crate) use self::core::{Runnable, Task};

mod core;

pub use self::core::spawn;
pub use handle::JoinHandle;
pub use set::{Completed, JoinSet};
