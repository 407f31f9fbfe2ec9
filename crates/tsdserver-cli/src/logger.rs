//! Logging setup for the tsdserver CLI.
//!
//! Everything logs through `tracing`. The subscriber installed here decides
//! what reaches the terminal:
//!
//! 1. `--verbose`: debug for tsdserver crates and the HTTP trace layer
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`, when set
//! 4. info for tsdserver crates
//!
//! ```rust,no_run
//! use tsdserver_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("Accepting connections on tcp://0.0.0.0:3000");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "tsdserver_core=debug,tsdserver_cli=debug,tsdserver=debug,tower_http=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "tsdserver_core=info,tsdserver_cli=info,tsdserver=info";

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Install the global subscriber with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .compact();

    // A second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Whether log output should carry ANSI colors.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise stderr must be a terminal
/// that supports colors.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::Term::stderr().features().colors_supported()
}
