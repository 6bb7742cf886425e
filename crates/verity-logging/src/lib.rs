// ABOUTME: Public API for verity's logging infrastructure using tokio-tracing
// ABOUTME: Provides configuration and one-shot initialization for test binaries

pub mod config;
pub mod layers;
pub mod subscriber;

// Re-export tracing macros for convenience
pub use tracing::{Level, debug, error, info, trace, warn};

// Re-export configuration types
pub use config::{LogLevel, LoggingConfig, OutputConfig};

pub use subscriber::init_subscriber;

use anyhow::Result;

/// Initialize logging for a test binary from `VERITY_LOG` / `RUST_LOG`.
///
/// Safe to call at the top of every test. Returns an error only when the
/// environment holds invalid directives or another subscriber won the race.
pub fn init_test_logging() -> Result<()> {
    let config = LoggingConfig::from_env()?;
    init_subscriber(config)
}
