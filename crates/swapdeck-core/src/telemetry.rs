//! Tracing bootstrap for embedding applications.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG` when set; otherwise defaults to per-crate targets.
/// Calling this more than once is harmless — later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("swapdeck_core=debug,swapdeck_store=info,swapdeck_content=info,warn")
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
