//! CliError for the terminal front-end

use std::path::PathBuf;

use minimarket_lib::error::{ConfigError, TableError};

/// Error type for the REPL and its startup.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Terminal or file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The configured columns were rejected.
    #[error(transparent)]
    Table(#[from] TableError),

    /// A rows file is not valid JSON.
    #[error("Invalid JSON in '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A rows file is JSON but not an array of objects.
    #[error("Expected a JSON array of objects in '{}'", path.display())]
    NotRows { path: PathBuf },

    /// The logger was already installed.
    #[error("Logger setup failed: {0}")]
    Logger(#[from] log::SetLoggerError),

    /// Timers need a tokio runtime.
    #[error("No tokio runtime: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),

    /// First word of the input is not a command.
    #[error("Unknown command '{0}'. Type 'help' for a list.")]
    UnknownCommand(String),

    /// A command got the wrong arguments.
    #[error("Usage: {0}")]
    Usage(&'static str),

    /// No notification at that position.
    #[error("No notification #{0}")]
    NoNotification(usize),

    /// The row or action does not exist.
    #[error("No action '{name}' for row {id}")]
    NoAction { name: String, id: String },
}
