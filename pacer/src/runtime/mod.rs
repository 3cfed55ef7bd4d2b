//! Executor runtime that physically runs work units.
//!
//! This module contains the multi-threaded, work-stealing executor the
//! harness drives its batches on. It is responsible for:
//! - owning the worker threads that poll tasks,
//! - distributing tasks through a global injector and per-worker queues,
//! - exposing task spawning, join handles and completion-ordered join sets,
//! - installing the per-thread context (reactor, injector, worker id).
//!
//! A blocking unit occupies one of these worker threads for its whole delay,
//! which is what makes thread exhaustion observable. A non-blocking unit
//! returns its thread to the executor while its timer is pending.

mod core;
mod executor;
mod work_stealing;

pub(crate) mod builder;
pub(crate) mod context;

pub mod task;

pub use self::core::Runtime;
