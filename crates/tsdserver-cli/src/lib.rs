//! tsdserver CLI - serve a project's ES modules to the browser as-is.
//!
//! The request pipeline lives in `tsdserver-core`; this crate adds
//! everything around it:
//!
//! - [`cli`] - argument parsing
//! - [`config`] - options file discovery, layering and validation
//! - [`commands`] - `serve` and `check`
//! - [`server`] - the axum router, listen endpoints and graceful shutdown
//! - [`error`] - error types with actionable hints
//! - [`logger`] - tracing setup
//! - [`ui`] - terminal status messages

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod server;
pub mod ui;

pub use error::{CliError, ConfigError, Result, ResultExt, ServerError};
