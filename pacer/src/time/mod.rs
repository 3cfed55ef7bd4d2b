//! Time utilities backed by the runtime reactor.
//!
//! - [`sleep`]: the yielding delay a non-blocking unit waits on,
//! - [`instrumented`]: wall-clock measurement of a future, used to time
//!   whole batches.

mod instrumented;
mod sleep;

#[doc(inline)]
pub use instrumented::{Instrumented, instrumented};

#[doc(inline)]
pub use sleep::{Sleep, sleep};
