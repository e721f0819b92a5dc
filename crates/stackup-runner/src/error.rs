//! Error types for runner module

use std::time::Duration;
use thiserror::Error;

/// Process execution errors
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Program not found in PATH: {program}")]
    ProgramNotFound { program: String },

    #[error("Native execution failed: {reason}")]
    NativeExecutionFailed { reason: String },

    #[error("Execution timed out after {timeout:?}")]
    Timeout { timeout: Duration },
}
