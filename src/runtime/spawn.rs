//! Detached execution for abandoned probe futures

use std::future::Future;

/// Let a timed-out probe future keep running unobserved.
///
/// Timeouts abandon a probe rather than cancel it: most probes wrap browser
/// APIs with no abort support, and dropping the future mid-await would tear
/// down work the environment is still doing. In the browser the future is
/// parked on the event loop via `spawn_local`; late settlement cannot reach
/// the already-recorded outcome. Native builds have no event loop to park
/// work on, so there the future is dropped.
pub fn spawn_abandoned<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    #[cfg(target_arch = "wasm32")]
    wasm_bindgen_futures::spawn_local(future);
    #[cfg(not(target_arch = "wasm32"))]
    drop(future);
}
