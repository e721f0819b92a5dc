use std::path::{Path, PathBuf};
use std::process::Stdio;

use stackup_config::Config;
use stackup_phases::PhaseDescriptor;
use stackup_runner::CommandSpec;
use stackup_utils::error::PhaseError;

/// Everything a phase invocation receives.
#[derive(Debug, Clone)]
pub struct PhaseContext {
    /// Installation root; resolved executables live under it and it is
    /// passed to every phase as its only argument.
    pub root: PathBuf,
    /// Exported to the phase as environment variables.
    pub config: Config,
}

impl PhaseContext {
    pub fn new(root: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }
}

/// Runs one phase to completion.
///
/// `Ok(())` means the phase succeeded. Implementations must not retry and
/// must not attempt to undo a failed phase.
pub trait PhaseExecutor {
    fn execute(&mut self, phase: &PhaseDescriptor, ctx: &PhaseContext) -> Result<(), PhaseError>;
}

impl<E: PhaseExecutor + ?Sized> PhaseExecutor for &mut E {
    fn execute(&mut self, phase: &PhaseDescriptor, ctx: &PhaseContext) -> Result<(), PhaseError> {
        (**self).execute(phase, ctx)
    }
}

/// Executes phases as child processes.
///
/// The child inherits stdout and stderr so the operator sees its output
/// live, gets a closed stdin, and runs with the installation root as its
/// working directory. There is no timeout: the orchestrator waits for as
/// long as the phase takes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptExecutor;

impl ScriptExecutor {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Command line for `phase`, with the configuration layered over the
    /// inherited environment.
    #[must_use]
    pub fn command_for(phase: &PhaseDescriptor, ctx: &PhaseContext) -> CommandSpec {
        CommandSpec::new(phase.resolve(&ctx.root))
            .arg(&ctx.root)
            .cwd(&ctx.root)
            .envs(ctx.config.iter())
    }
}

impl PhaseExecutor for ScriptExecutor {
    fn execute(&mut self, phase: &PhaseDescriptor, ctx: &PhaseContext) -> Result<(), PhaseError> {
        let path = phase.resolve(&ctx.root);
        if !path.is_file() {
            return Err(PhaseError::PhaseNotFound {
                id: phase.id().to_string(),
                path,
            });
        }

        ensure_executable(&path).map_err(|e| PhaseError::SpawnFailed {
            id: phase.id().to_string(),
            reason: format!("could not mark {} executable: {e}", path.display()),
        })?;

        let status = Self::command_for(phase, ctx)
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| PhaseError::SpawnFailed {
                id: phase.id().to_string(),
                reason: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(PhaseError::PhaseExecutionFailed {
                id: phase.id().to_string(),
                exit_code: status.code(),
            })
        }
    }
}

/// Add execute bits for everyone who can already read the file.
#[cfg(unix)]
fn ensure_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path)?;
    let mode = metadata.permissions().mode();
    let wanted = mode | ((mode & 0o444) >> 2);
    if wanted != mode {
        tracing::debug!(
            path = %path.display(),
            from = %format!("{mode:o}"),
            to = %format!("{wanted:o}"),
            "Marking phase executable"
        );
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(wanted))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
