use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::exit_codes::ExitCode;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `StackupError` is what the orchestrator returns across crate
/// boundaries. Every variant is fatal for the run; non-fatal conditions
/// (a failing diagnostic inspection, an exhausted address lookup) are
/// contained inside their own component and never become a
/// `StackupError`.
///
/// | Category | Raised |
/// |----------|--------|
/// | `Config` | before any phase runs |
/// | `Phase` | at the moment a phase would run or after it exits |
/// | `Registry` | while building the phase list |
///
/// Library code returns `StackupError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum StackupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Phase error: {0}")]
    Phase(#[from] PhaseError),

    #[error("Phase registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    PhaseExecution,
    Registry,
    FileSystem,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::PhaseExecution => write!(f, "Phase Execution"),
            Self::Registry => write!(f, "Phase Registry"),
            Self::FileSystem => write!(f, "File System"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {}", path.display())]
    ConfigurationMissing { path: PathBuf },

    #[error("Required variable {key} is missing or empty in {}", path.display())]
    RequiredVariableMissing { key: String, path: PathBuf },

    #[error("Invalid line {line_number} in {}: {line}", path.display())]
    InvalidLine {
        path: PathBuf,
        line_number: usize,
        line: String,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::ConfigurationMissing { path } => {
                format!("Configuration file not found: {}", path.display())
            }
            Self::RequiredVariableMissing { key, path } => {
                format!(
                    "Required variable '{key}' is not set in {}",
                    path.display()
                )
            }
            Self::InvalidLine {
                path,
                line_number,
                line,
            } => format!(
                "Line {line_number} of {} is not a KEY=value assignment: {line}",
                path.display()
            ),
            Self::Io { path, source } => {
                format!("Could not read {}: {source}", path.display())
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::ConfigurationMissing { .. } => Some(
                "Every run reads its settings from a KEY=value environment file before any phase starts."
                    .to_string(),
            ),
            Self::RequiredVariableMissing { .. } => Some(
                "Required variables are checked before the first phase so a half-configured machine is never provisioned."
                    .to_string(),
            ),
            Self::InvalidLine { .. } => Some(
                "The environment file accepts KEY=value lines, comments starting with '#', and blank lines."
                    .to_string(),
            ),
            Self::Io { .. } => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ConfigurationMissing { path } => vec![
                format!("Copy .env.example to {} and fill in the values", path.display()),
                "Use --env-file <path> to point at an existing file".to_string(),
            ],
            Self::RequiredVariableMissing { key, path } => vec![
                format!("Add {key}=<value> to {}", path.display()),
                "Compare the file against .env.example for other missing keys".to_string(),
            ],
            Self::InvalidLine { .. } => vec![
                "Variable names may contain only letters, digits and underscores".to_string(),
                "Quote values that contain spaces or '#'".to_string(),
            ],
            Self::Io { .. } => vec!["Check the file permissions".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Io { .. } => ErrorCategory::FileSystem,
            _ => ErrorCategory::Configuration,
        }
    }
}

/// Phase execution errors
#[derive(Error, Debug)]
pub enum PhaseError {
    #[error("Phase {id} executable not found at {}", path.display())]
    PhaseNotFound { id: String, path: PathBuf },

    #[error("Phase {id} could not be started: {reason}")]
    SpawnFailed { id: String, reason: String },

    #[error("Phase {id} failed with {}", describe_exit(*exit_code))]
    PhaseExecutionFailed { id: String, exit_code: Option<i32> },
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "termination by signal".to_string(),
    }
}

impl PhaseError {
    /// Only a phase whose child process actually ran and exited non-zero
    /// leaves the machine in a state worth snapshotting.
    #[must_use]
    pub fn wants_diagnostics(&self) -> bool {
        matches!(self, Self::PhaseExecutionFailed { .. })
    }
}

impl UserFriendlyError for PhaseError {
    fn user_message(&self) -> String {
        match self {
            Self::PhaseNotFound { id, path } => format!(
                "The {id} phase has no executable at {}",
                path.display()
            ),
            Self::SpawnFailed { id, reason } => {
                format!("The {id} phase could not be started: {reason}")
            }
            Self::PhaseExecutionFailed { id, exit_code } => format!(
                "The {id} phase failed ({})",
                describe_exit(*exit_code)
            ),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::PhaseNotFound { .. } => Some(
                "Phases are resolved relative to the installation root passed with --root."
                    .to_string(),
            ),
            Self::SpawnFailed { .. } => None,
            Self::PhaseExecutionFailed { .. } => Some(
                "Phases already completed were left in place; nothing was rolled back."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::PhaseNotFound { .. } => vec![
                "Check that --root points at the repository checkout".to_string(),
                "Restore the missing script from version control".to_string(),
            ],
            Self::SpawnFailed { .. } => vec![
                "Check the script's shebang line and that its interpreter is installed"
                    .to_string(),
            ],
            Self::PhaseExecutionFailed { id, .. } => vec![
                "Read the phase output above and the diagnostic snapshot below".to_string(),
                "Fix the cause, then re-run; completed phases are safe to repeat".to_string(),
                format!(
                    "To resume past earlier phases use --skip with their names, not {id}"
                ),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::PhaseNotFound { .. } => ErrorCategory::FileSystem,
            _ => ErrorCategory::PhaseExecution,
        }
    }
}

/// Phase registry construction errors.
///
/// These are programming errors in the built-in phase list and surface
/// at startup rather than at first use.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate phase id: {id}")]
    DuplicateId { id: String },

    #[error("Phase alias '{alias}' is shared by {first} and {second}")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },

    #[error("Invalid phase id '{id}': {reason}")]
    InvalidId { id: String, reason: String },

    #[error("Phase registry is empty")]
    Empty,
}

impl UserFriendlyError for StackupError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.user_message(),
            Self::Phase(e) => e.user_message(),
            Self::Registry(e) => format!("The built-in phase list is invalid: {e}"),
            Self::Io(e) => format!("I/O failure: {e}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(e) => e.context(),
            Self::Phase(e) => e.context(),
            Self::Registry(_) | Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(e) => e.suggestions(),
            Self::Phase(e) => e.suggestions(),
            Self::Registry(_) => vec!["Report this as a bug".to_string()],
            Self::Io(_) => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(e) => e.category(),
            Self::Phase(e) => e.category(),
            Self::Registry(_) => ErrorCategory::Registry,
            Self::Io(_) => ErrorCategory::FileSystem,
        }
    }
}

impl StackupError {
    /// Get a user-friendly error message with context and actionable suggestions.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("✗ {}\n", self.user_message()));

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the CLI exit code.
    ///
    /// All fatal causes share one code.
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        ExitCode::FAILURE
    }

    /// Whether this error should trigger the failure diagnostics battery.
    #[must_use]
    pub fn wants_diagnostics(&self) -> bool {
        matches!(self, Self::Phase(e) if e.wants_diagnostics())
    }
}
