//! Command-line interface for stackup
//!
//! - `args`: CLI argument definitions (clap)
//! - `run`: entry point, error boundary and output
//! - `tests`: test module (cfg(test) only)

pub mod args;
mod run;


pub use args::{Cli, build_cli};
pub use run::run;
