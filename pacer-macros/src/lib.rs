mod utils;

use proc_macro::TokenStream;

/// Runs an `async fn main` on a pacer runtime.
///
/// ```rust,ignore
/// #[pacer::main(worker_threads = 4)]
/// async fn main() {
///     // ...
/// }
/// ```
///
/// Without `worker_threads`, the runtime has one worker per logical CPU.
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let worker_threads = match utils::parse_worker_threads(attr) {
        Ok(n) => n,
        Err(msg) => return utils::compile_error(&msg),
    };

    utils::block_on_body(item, worker_threads)
        .unwrap_or_else(|| utils::compile_error("#[pacer::main] expects a function with a body"))
}

/// Turns an `async fn` into a `#[test]` that runs on its own pacer runtime.
///
/// Accepts the same `worker_threads = N` argument as [`macro@main`].
#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let worker_threads = match utils::parse_worker_threads(attr) {
        Ok(n) => n,
        Err(msg) => return utils::compile_error(&msg),
    };

    let Some(function) = utils::block_on_body(item, worker_threads) else {
        return utils::compile_error("#[pacer::test] expects a function with a body");
    };

    let mut expanded: TokenStream = "#[test]".parse().unwrap_or_default();
    expanded.extend(function);
    expanded
}
