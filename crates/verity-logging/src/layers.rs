// ABOUTME: Layer construction for test-binary logging
// ABOUTME: Builds the env filter and a console layer that writes through libtest's capture

use anyhow::Result;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LoggingConfig, OutputConfig};

/// Boxed layer type stacked onto the registry.
pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Create the console layer.
///
/// Output goes through `with_test_writer`, so it is captured per test and only
/// shown for failing tests (or with `--nocapture`).
pub fn create_console_layer(config: &OutputConfig) -> Option<BoxedLayer> {
    if !config.console {
        return None;
    }

    let layer = if config.json {
        fmt::layer()
            .json()
            .with_test_writer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_test_writer()
            .with_ansi(config.ansi)
            .with_target(true)
            .with_thread_names(true)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .boxed()
    };

    Some(layer)
}

/// Create an environment filter from the logging configuration.
pub fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    let mut filter = EnvFilter::new(format!("{}", config.level.0));

    for (module, level) in &config.module_levels {
        filter = filter.add_directive(format!("{}={}", module, level.0).parse()?);
    }

    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use tracing::Level;

    #[test]
    fn test_env_filter_carries_module_directives() {
        let mut config = LoggingConfig::default();
        config
            .module_levels
            .insert("verity".to_string(), LogLevel(Level::TRACE));

        let filter = create_env_filter(&config).unwrap();
        let rendered = filter.to_string().to_lowercase();
        assert!(rendered.contains("verity=trace"), "filter: {rendered}");
        assert!(rendered.contains("warn"), "filter: {rendered}");
    }

    #[test]
    fn test_env_filter_rejects_bad_target() {
        let mut config = LoggingConfig::default();
        config
            .parse_directives("#verity=trace")
            .expect("level part is valid");

        assert!(create_env_filter(&config).is_err());
    }

    #[test]
    fn test_env_filter_scopes_levels_by_target() {
        use tracing_subscriber::prelude::*;

        let mut config = LoggingConfig::default();
        config.parse_directives("error,verity=trace").unwrap();
        let subscriber = tracing_subscriber::registry().with(create_env_filter(&config).unwrap());

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(target: "verity::assert", Level::TRACE));
            assert!(tracing::enabled!(target: "harness", Level::ERROR));
            assert!(!tracing::enabled!(target: "harness", Level::WARN));
        });
    }

    #[test]
    fn test_console_layer_disabled() {
        let output = OutputConfig {
            console: false,
            ..OutputConfig::default()
        };
        assert!(create_console_layer(&output).is_none());
    }

    #[test]
    fn test_console_layer_variants() {
        assert!(create_console_layer(&OutputConfig::default()).is_some());

        let json = OutputConfig {
            json: true,
            ..OutputConfig::default()
        };
        assert!(create_console_layer(&json).is_some());
    }
}
