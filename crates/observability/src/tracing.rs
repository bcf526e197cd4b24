//! Tracing subscriber wiring.

use tracing_subscriber::EnvFilter;

/// Default directive when `RUST_LOG` is unset. Command traffic from the
/// engine logs at `info`; parser detail sits at `debug`.
const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber with the `RUST_LOG`-derived filter.
pub fn init() {
    init_with_filter(DEFAULT_DIRECTIVE);
}

/// Install the global subscriber, falling back to `directive` when
/// `RUST_LOG` is unset. JSON lines, one object per event.
///
/// Uses `try_init` so tests and embedders that already installed a
/// subscriber are left alone.
pub fn init_with_filter(directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
