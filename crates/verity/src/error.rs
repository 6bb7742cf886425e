// ABOUTME: Error types for caller-filter configuration
// ABOUTME: Assertion outcomes never use these; they only cover malformed filter settings

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse caller filter: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Dispatch marker at index {index} is empty and would match every frame")]
    EmptyDispatchMarker { index: usize },

    #[error("Internal directory at index {index} is empty")]
    EmptyDirectory { index: usize },
}
