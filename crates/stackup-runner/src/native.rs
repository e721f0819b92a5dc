use crate::error::RunnerError;
use std::process::Stdio;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use super::{CommandSpec, ProcessOutput, ProcessRunner};

// ============================================================================
// NativeRunner - captured native process execution
// ============================================================================

/// Native process runner using `std::process::Command`.
///
/// Stdin is closed, stdout and stderr are captured. A waiter thread
/// collects the output; if it does not report back within the timeout
/// the child's process group is killed and [`RunnerError::Timeout`] is
/// returned without waiting for the pipes to drain.
///
/// On Unix the child leads its own process group, so descendants that
/// inherited the output pipes die with it.
///
/// # Example
///
/// ```rust,no_run
/// use stackup_runner::{CommandSpec, NativeRunner, ProcessRunner};
/// use std::time::Duration;
///
/// let output = NativeRunner::new()
///     .run(&CommandSpec::new("kubectl").args(["get", "nodes"]), Duration::from_secs(15))
///     .unwrap();
/// println!("{}", output.stdout_string());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRunner;

impl NativeRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessRunner for NativeRunner {
    fn run(&self, cmd: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunnerError> {
        let mut command = cmd.to_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RunnerError::ProgramNotFound {
                    program: cmd.program_name(),
                }
            } else {
                RunnerError::NativeExecutionFailed {
                    reason: format!("Failed to spawn process '{}': {e}", cmd.program_name()),
                }
            }
        })?;

        let (tx, rx) = mpsc::channel();
        let child_id = child.id();

        let handle = thread::spawn(move || {
            let output = child.wait_with_output();
            let _ = tx.send(output);
        });

        match rx.recv_timeout(timeout) {
            Ok(output_result) => {
                let _ = handle.join();

                let output = output_result.map_err(|e| RunnerError::NativeExecutionFailed {
                    reason: format!("Failed to wait for process: {e}"),
                })?;

                Ok(ProcessOutput::new(
                    output.stdout,
                    output.stderr,
                    output.status.code(),
                ))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::debug!(
                    program = %cmd.program_name(),
                    timeout_ms = timeout.as_millis(),
                    "Killing timed-out process group"
                );
                Self::terminate_process_group(child_id);
                // Detached: a descendant that left the group may still hold the pipes.
                drop(handle);

                Err(RunnerError::Timeout { timeout })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(RunnerError::NativeExecutionFailed {
                reason: "Process monitoring thread terminated unexpectedly".to_string(),
            }),
        }
    }
}

impl NativeRunner {
    /// Send SIGKILL to the process group led by `pid`. No-op off Unix.
    fn terminate_process_group(pid: u32) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{Signal, killpg};
            use nix::unistd::Pid;

            if let Ok(raw) = i32::try_from(pid) {
                let _ = killpg(Pid::from_raw(raw), Signal::SIGKILL);
            }
        }

        #[cfg(not(unix))]
        {
            let _ = pid;
        }
    }
}
