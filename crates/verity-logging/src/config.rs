// ABOUTME: Logging configuration for test binaries, read from VERITY_LOG / RUST_LOG
// ABOUTME: Directive parsing and output switches; lookups are injectable so tests avoid the real environment

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::Level;
use tracing::metadata::ParseLevelError;

/// Level directive variable, checked before `RUST_LOG`.
pub const LEVEL_VAR: &str = "VERITY_LOG";
pub const JSON_VAR: &str = "VERITY_LOG_JSON";
pub const NO_ANSI_VAR: &str = "VERITY_LOG_NO_ANSI";

/// `tracing::Level` that (de)serializes as its lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LogLevel(pub Level);

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(LogLevel)
    }
}

impl TryFrom<String> for LogLevel {
    type Error = ParseLevelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.0.as_str().to_ascii_lowercase()
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        LogLevel(level)
    }
}

/// Logging configuration for a test binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for every target without an override. Assertion failures log at
    /// ERROR, so the default only hides verity's own chatter.
    pub level: LogLevel,

    /// Per-target overrides, e.g. `verity=trace` to watch the caller walk
    pub module_levels: HashMap<String, LogLevel>,

    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub console: bool,

    /// One JSON object per event instead of text
    pub json: bool,

    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel(Level::WARN),
            module_levels: HashMap::new(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            console: true,
            json: false,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(directives) = lookup(LEVEL_VAR) {
            self.parse_directives(&directives)
                .with_context(|| format!("Invalid {LEVEL_VAR} directives"))?;
        } else if let Some(directives) = lookup("RUST_LOG") {
            self.parse_directives(&directives)
                .context("Invalid RUST_LOG directives")?;
        }

        if lookup(JSON_VAR).is_some() {
            self.output.json = true;
        }
        if lookup(NO_ANSI_VAR).is_some() {
            self.output.ansi = false;
        }

        Ok(())
    }

    /// Parse directives such as `warn` or `info,verity=trace`.
    pub fn parse_directives(&mut self, directives: &str) -> Result<()> {
        for directive in directives.split(',').map(str::trim) {
            match directive.split_once('=') {
                None if directive.is_empty() => {}
                None => {
                    self.level = directive
                        .parse()
                        .with_context(|| format!("Invalid global log level '{directive}'"))?;
                }
                Some((module, level)) => {
                    let level = level.parse().with_context(|| {
                        format!("Invalid log level '{level}' for module '{module}'")
                    })?;
                    self.module_levels.insert(module.trim().to_string(), level);
                }
            }
        }
        Ok(())
    }
}
