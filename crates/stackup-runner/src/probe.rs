//! Best-effort read-only probes.
//!
//! A probe is a captured command whose failure is expected and must be
//! contained: callers turn a [`ProbeError`] into a placeholder or a
//! `false`, never into a fatal error.

use std::time::Duration;
use thiserror::Error;

use crate::{CommandSpec, ProcessRunner, RunnerError};

/// Why a probe produced no usable output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("{program} is not installed")]
    NotInstalled { program: String },

    #[error("{program} exited with {}", exit_code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}")))]
    Failed {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("{program} timed out after {timeout:?}")]
    TimedOut { program: String, timeout: Duration },

    #[error("{program} could not be run: {reason}")]
    Unrunnable { program: String, reason: String },
}

/// Run `cmd` and return its trimmed stdout if it exited 0.
pub fn run_probe<R: ProcessRunner + ?Sized>(
    runner: &R,
    cmd: &CommandSpec,
    timeout: Duration,
) -> Result<String, ProbeError> {
    let program = cmd.program_name();
    match runner.run(cmd, timeout) {
        Ok(output) if output.success() => Ok(output.stdout_string().trim_end().to_string()),
        Ok(output) => Err(ProbeError::Failed {
            program,
            exit_code: output.exit_code,
            stderr: output.stderr_string().trim().to_string(),
        }),
        Err(RunnerError::ProgramNotFound { .. }) => Err(ProbeError::NotInstalled { program }),
        Err(RunnerError::Timeout { timeout }) => Err(ProbeError::TimedOut { program, timeout }),
        Err(RunnerError::NativeExecutionFailed { reason }) => {
            Err(ProbeError::Unrunnable { program, reason })
        }
    }
}
