//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::LOG_ENV_VAR;

static INIT: Once = Once::new();

/// Default filter used when `LEADSCORE_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "leadscore_engine=info,leadscore_storage=info";

/// Initialize the tracing/logging system.
///
/// Reads `LEADSCORE_LOG` for per-crate log levels, e.g.
/// `LEADSCORE_LOG=leadscore_engine=debug,leadscore_storage=warn`.
///
/// Idempotent: only the first call installs a subscriber.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // try_init: a host process may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
