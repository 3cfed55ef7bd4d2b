use crate::reactor::ReactorHandle;
use crate::runtime::work_stealing::injector::InjectorHandle;
use crate::runtime::work_stealing::queue::LocalQueue;

use std::cell::RefCell;
use std::sync::Arc;

thread_local! {
    /// Reactor of the runtime this thread belongs to.
    pub(crate) static CURRENT_REACTOR: RefCell<Option<ReactorHandle>> =
        const { RefCell::new(None) };

    /// Global injector of the runtime this thread belongs to.
    pub(crate) static CURRENT_INJECTOR: RefCell<Option<InjectorHandle>> =
        const { RefCell::new(None) };

    /// Identifier of the executor worker running on this thread.
    pub(crate) static CURRENT_WORKER_ID: RefCell<Option<usize>> =
        const { RefCell::new(None) };

    /// Local queues of every worker, so `spawn` can push to its own.
    pub(crate) static CURRENT_LOCALS: RefCell<Option<Arc<Vec<Arc<LocalQueue>>>>> =
        const { RefCell::new(None) };
}

/// Installs the reactor and injector handles for the duration of `f`,
/// restoring whatever was installed before once it returns.
pub(crate) fn enter_context<R>(
    reactor: ReactorHandle,
    injector: InjectorHandle,
    f: impl FnOnce() -> R,
) -> R {
    CURRENT_REACTOR.with(|r| {
        CURRENT_INJECTOR.with(|i| {
            let prev_r = r.replace(Some(reactor));
            let prev_i = i.replace(Some(injector));

            let out = f();

            i.replace(prev_i);
            r.replace(prev_r);

            out
        })
    })
}

/// Returns the id of the executor worker polling on this thread, or `None`
/// outside of a runtime.
pub(crate) fn current_worker() -> Option<usize> {
    CURRENT_WORKER_ID.with(|id| *id.borrow())
}

/// Runs `f` with the current reactor handle.
///
/// # Panics
///
/// Panics with `what` if no runtime context is installed on this thread.
pub(crate) fn with_reactor<R>(what: &str, f: impl FnOnce(&ReactorHandle) -> R) -> R {
    CURRENT_REACTOR.with(|cell| {
        let binding = cell.borrow();
        let reactor = binding
            .as_ref()
            .unwrap_or_else(|| panic!("{what} outside of a pacer runtime"));

        f(reactor)
    })
}
