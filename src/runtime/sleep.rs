//! Timer future used for probe timeouts and retry delays

/// Resolve after `ms` milliseconds.
///
/// Browser builds use a `setTimeout`-backed future; native builds (unit
/// tests) park a helper thread and signal back over a oneshot channel.
pub async fn sleep(ms: u64) {
    #[cfg(target_arch = "wasm32")]
    {
        gloo_timers::future::TimeoutFuture::new(ms as u32).await;
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let (tx, rx) = futures::channel::oneshot::channel::<()>();
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(ms));
            let _ = tx.send(());
        });
        let _ = rx.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::now_ms;

    #[test]
    fn test_sleep_waits() {
        let before = now_ms();
        futures::executor::block_on(sleep(20));
        let elapsed = now_ms() - before;
        // Allow scheduler slop in either direction
        assert!(elapsed >= 15, "slept only {}ms", elapsed);
    }
}
