//! Work-stealing queues.
//!
//! - [`injector`]: the global queue new and woken tasks land in; it also
//!   parks idle workers,
//! - [`queue`]: per-worker local queues, popped LIFO by their owner and
//!   stolen FIFO by peers.

pub(crate) mod injector;
pub(crate) mod queue;
