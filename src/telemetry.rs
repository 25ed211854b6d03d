//! Tracing bootstrap for hosts embedding `spacetime-rs`.
//!
//! Scale builds, projection batches and backend failures are reported through
//! `tracing`. Hosts either call one of the helpers below or install their own
//! subscriber and filters.

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "spacetime_rs=info";

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// [`DEFAULT_FILTER`].
///
/// Returns `false` when the `telemetry` feature is disabled or a global
/// subscriber is already installed.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing_with_fallback(DEFAULT_FILTER)
}

/// Same as [`init_default_tracing`] with a caller-provided fallback directive,
/// e.g. `"spacetime_rs::projection=trace"` while debugging the loader.
#[must_use]
pub fn init_tracing_with_fallback(fallback: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = fallback;
        false
    }
}
