//! ConfigError for panel configuration loading

use std::path::PathBuf;

/// Error type for loading and validating a [`PanelConfig`](crate::config::PanelConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or does not match the schema.
    #[error("Config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its allowed range.
    #[error("Invalid config value for '{field}': {message}")]
    Invalid { field: &'static str, message: String },

    /// A column definition is rejected by the table engine.
    #[error("Invalid column configuration: {0}")]
    Columns(#[from] super::TableError),
}

impl ConfigError {
    /// Creates a new invalid value error.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}
