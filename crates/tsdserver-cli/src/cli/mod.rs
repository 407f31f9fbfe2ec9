//! Command-line interface definition.
//!
//! - `tsdserver serve [CONFIG] [--listen URI]...` - run the server
//! - `tsdserver check [CONFIG]` - validate the options file

mod commands;

use clap::Parser;

pub use commands::{CheckArgs, Command, ServeArgs};

/// tsdserver - serve ES modules to the browser without a bundler
#[derive(Parser, Debug)]
#[command(
    name = "tsdserver",
    version,
    about = "Development server that rewrites ES module imports for the browser",
    long_about = "tsdserver serves a project directory over HTTP and rewrites bare import\n\
                  specifiers in JavaScript modules (`import 'lit'`) into paths the browser\n\
                  can load, so compiled TypeScript runs without a bundling step."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Logs every request, every rewritten or elided import and the
    /// HTTP trace of each connection.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
