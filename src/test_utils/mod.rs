//! Test utilities for typman.
//!
//! Shared helpers for unit and integration tests. Enabled for the crate's
//! own tests and for external test binaries via the `test-utils` feature.

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Guards against installing the test subscriber twice
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Idempotent: only the first call installs a subscriber. Respects
/// `RUST_LOG` when set; otherwise uses the provided level, or stays silent
/// when neither is given.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
