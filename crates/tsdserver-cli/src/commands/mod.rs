//! Command implementations.
//!
//! - [`serve`] - run the development server
//! - [`check`] - validate the options file
//!
//! Each command provides an `execute` function taking its parsed arguments.

pub mod check;
pub mod serve;
mod utils;

pub use check::execute as check_execute;
pub use serve::execute as serve_execute;
