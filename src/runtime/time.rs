//! Clock access for duration measurement and payload timestamps

/// Milliseconds on a monotonic-ish clock, for measuring unit durations.
///
/// Uses `performance.now()` in the browser (monotonic, sub-ms resolution),
/// falling back to `Date.now()` when no Performance object exists (workers
/// with a trimmed global, some embedders).
pub fn now_ms() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now() as u64)
            .unwrap_or_else(|| js_sys::Date::now() as u64)
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::sync::OnceLock;
        use std::time::Instant;
        static START: OnceLock<Instant> = OnceLock::new();
        START.get_or_init(Instant::now).elapsed().as_millis() as u64
    }
}

/// Wall-clock milliseconds since the Unix epoch, for payload timestamps.
pub fn wallclock_ms() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_monotonic() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
    }

    #[test]
    fn test_wallclock_is_epoch_scale() {
        // Any plausible wall clock is past 2020-01-01
        assert!(wallclock_ms() > 1_577_836_800_000);
    }
}
