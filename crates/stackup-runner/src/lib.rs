//! Process execution for stackup
//!
//! All process execution goes through [`CommandSpec`] to ensure argv-style
//! invocation. Arguments are passed as discrete elements rather than shell
//! strings, so no phase name, path or configuration value is ever
//! interpreted by a shell.
//!
//! - [`ProcessRunner`] captures output under a timeout; diagnostics and
//!   feature probes use it.
//! - [`probe`] turns a captured run into a success-or-reason result.

pub mod command_spec;
pub mod error;
pub mod native;
pub mod probe;
pub mod process;

pub use command_spec::CommandSpec;
pub use error::RunnerError;
pub use native::NativeRunner;
pub use probe::{ProbeError, run_probe};
pub use process::{ProcessOutput, ProcessRunner};
