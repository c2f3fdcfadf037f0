//! Tracing hooks for observing hand-off decisions.
//!
//! Enable with `--features tracing`. With the feature off, every macro in
//! this module compiles to nothing, so the queues carry no logging overhead.

/// Initialize the tracing subscriber with timestamps.
///
/// Call this at the start of tests or examples to see hand-off activity.
/// Honors `RUST_LOG`, defaulting to `postbox=trace`. Does nothing if the
/// `tracing` feature is not enabled.
#[cfg(feature = "tracing")]
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("postbox=trace"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .init();
}

#[cfg(not(feature = "tracing"))]
pub const fn init_tracing() {}

// When tracing is enabled, re-export the macros the queues use.
#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace};

// When tracing is disabled, provide no-op macro implementations.
#[cfg(not(feature = "tracing"))]
macro_rules! debug_noop {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_noop {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use debug_noop as debug;
#[cfg(not(feature = "tracing"))]
pub(crate) use trace_noop as trace;
