use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::server::{ListenEndpoint, parse_endpoint};

/// Available tsdserver subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the project
    ///
    /// Resolves request paths against the project root, rewrites import
    /// specifiers in JavaScript modules and answers conditional requests.
    Serve(ServeArgs),

    /// Validate the options file
    ///
    /// Prints every entry that would be ignored or replaced by a default,
    /// followed by the effective configuration.
    Check(CheckArgs),
}

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Options file (tsdserver.json, .toml or .yaml)
    ///
    /// When omitted, the first of tsdserver.json, tsdserver.toml and
    /// tsdserver.yaml in the working directory is used, or the built-in
    /// defaults if none exists.
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Endpoint to accept connections on
    ///
    /// May be given several times; all endpoints are served at once.
    ///
    /// Examples:
    ///   --listen tcp://127.0.0.1:8080
    ///   --listen unix:/run/tsdserver.sock
    #[arg(
        short,
        long,
        value_name = "URI",
        default_value = "tcp://0.0.0.0:3000",
        value_parser = parse_endpoint
    )]
    pub listen: Vec<ListenEndpoint>,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Options file to validate
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the JSON Schema of the options file instead
    #[arg(long, conflicts_with = "config")]
    pub schema: bool,
}
