// ABOUTME: Tracing subscriber initialization for test binaries
// ABOUTME: Combines the env filter with the console layer and installs it once per process

use anyhow::{Context, Result};
use std::sync::OnceLock;

use crate::config::LoggingConfig;
use crate::layers::{create_console_layer, create_env_filter};

/// Outcome of the first initialization attempt in this process.
static INIT_OUTCOME: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/// Initialize the global tracing subscriber with the given configuration.
///
/// Only the first call in a process installs a subscriber; later calls return
/// the first call's outcome. Tests run on many threads of one process, so every
/// test may call this unconditionally.
pub fn init_subscriber(config: LoggingConfig) -> Result<()> {
    let outcome = INIT_OUTCOME.get_or_init(|| install(&config).map_err(|e| format!("{e:#}")));

    match outcome {
        Ok(()) => Ok(()),
        Err(message) => anyhow::bail!("Logging initialization failed: {message}"),
    }
}

fn install(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{Layer, prelude::*, util::SubscriberInitExt};

    let env_filter = create_env_filter(config).context("Failed to create environment filter")?;
    let console = create_console_layer(&config.output).map(|layer| layer.with_filter(env_filter));

    tracing_subscriber::registry()
        .with(console)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    tracing::debug!(
        log_level = %config.level.0,
        console_output = config.output.console,
        json_output = config.output.json,
        "Verity logging initialized"
    );

    Ok(())
}
