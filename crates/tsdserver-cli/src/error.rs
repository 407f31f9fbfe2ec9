//! Error handling for the tsdserver CLI.
//!
//! Every variant that a user can run into carries a `Hint:` telling them
//! what to change. Command functions return [`Result`]; `main` turns the
//! final error into a `miette` report.
//!
//! # Example
//!
//! ```rust,no_run
//! use tsdserver_cli::error::{Result, ResultExt};
//! use std::path::{Path, PathBuf};
//!
//! fn socket_dir(path: &Path) -> Result<PathBuf> {
//!     path.canonicalize()
//!         .with_path(path)
//!         .with_hint("Create the directory before listening on a unix socket in it")
//! }
//! ```

mod diagnostic;

use std::path::PathBuf;
use thiserror::Error;

pub use diagnostic::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Options file missing, malformed or semantically invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Listener setup or serving failure
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly named options file does not exist
    #[error("Config file not found: {}\n\nHint: Create tsdserver.json in the project directory or pass the options file path", .0.display())]
    NotFound(PathBuf),

    /// Options file extension is not one we can parse
    #[error("Unsupported config file format: {}\n\nHint: Use a .json, .toml or .yaml options file", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Options file has the wrong shape (unknown field, wrong type)
    #[error("Invalid configuration{}: {reason}\n\nHint: Check field names and types; unknown fields are rejected", .source_name.as_deref().map(|s| format!(" in {s}")).unwrap_or_default())]
    Invalid {
        /// File the problem came from, when known
        source_name: Option<String>,
        /// Message from the configuration loader
        reason: String,
    },

    /// Entries were dropped or replaced by defaults
    #[error("{count} configuration issue(s):\n{issues}\n\nHint: Fix the entries above; the server would run with them ignored")]
    ValidationFailed {
        /// Number of issues
        count: usize,
        /// One issue per line
        issues: String,
    },
}

/// Listen endpoint and serving errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Listen URI could not be parsed
    #[error("Invalid listen endpoint '{uri}': {reason}\n\nHint: Use tcp://host:port, unix:/path/to.sock or pipe:\\\\.\\pipe\\name")]
    InvalidEndpoint {
        /// The URI as given
        uri: String,
        /// What is wrong with it
        reason: String,
    },

    /// Endpoint kind this build cannot serve
    #[error("Listen endpoint '{0}' is not supported on this platform\n\nHint: Listen on a tcp:// endpoint instead")]
    UnsupportedEndpoint(String),

    /// Socket could not be bound
    #[error("Failed to bind {endpoint}: {source}\n\nHint: Check that the address is free and that you may listen on it")]
    Bind {
        /// Endpoint that failed
        endpoint: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A listener stopped with an error
    #[error("Listener on {endpoint} failed: {reason}")]
    Serve {
        /// Endpoint that failed
        endpoint: String,
        /// What went wrong
        reason: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a "not found" I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}
