//! Wall-clock timing for perf metrics

/// Milliseconds on the clock perf stats are measured with: `Date.now()` in
/// the browser (no `Instant` on wasm32-unknown-unknown), otherwise time since
/// the first call.
pub(crate) fn now_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Date::now()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::sync::OnceLock;
        use std::time::Instant;

        static EPOCH: OnceLock<Instant> = OnceLock::new();
        EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
    }
}

/// Run `f`, timing it only when `enabled`.
pub(crate) fn timed<T>(enabled: bool, f: impl FnOnce() -> T) -> (T, f64) {
    if !enabled {
        return (f(), 0.0);
    }
    let started = now_ms();
    let out = f();
    (out, now_ms() - started)
}
