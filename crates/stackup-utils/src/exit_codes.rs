//! Exit code constants for stackup.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Every phase succeeded or was skipped |
//! | 1 | `FAILURE` | Configuration validation failed or a phase failed |
//! | 2 | `CLI_ARGS` | Invalid command-line arguments (reported by clap) |
//!
//! Failure causes deliberately share one code; the operator reads the
//! banner and the diagnostic snapshot to tell them apart.

/// Exit codes matching the documented exit code table.
///
/// # Example
///
/// ```rust
/// use stackup_utils::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::FAILURE, ExitCode::from_i32(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - the pipeline completed
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Failure - configuration or phase failure
    pub const FAILURE: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid or missing command-line arguments
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    ///
    /// Prefer using the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, PhaseError, StackupError};
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
        assert_eq!(ExitCode::FAILURE.as_i32(), 1);
        assert_eq!(ExitCode::CLI_ARGS.as_i32(), 2);
        assert!(ExitCode::SUCCESS.is_success());
        assert!(!ExitCode::FAILURE.is_success());
    }

    #[test]
    fn test_exit_code_conversions() {
        let code: ExitCode = 1.into();
        assert_eq!(code, ExitCode::FAILURE);
        let raw: i32 = ExitCode::CLI_ARGS.into();
        assert_eq!(raw, 2);
    }

    #[test]
    fn test_every_fatal_error_maps_to_failure() {
        let errors = vec![
            StackupError::Config(ConfigError::ConfigurationMissing {
                path: PathBuf::from(".env"),
            }),
            StackupError::Config(ConfigError::RequiredVariableMissing {
                key: "DOMAIN".to_string(),
                path: PathBuf::from(".env"),
            }),
            StackupError::Phase(PhaseError::PhaseNotFound {
                id: "02-docker".to_string(),
                path: PathBuf::from("scripts/02-docker.sh"),
            }),
            StackupError::Phase(PhaseError::PhaseExecutionFailed {
                id: "02-docker".to_string(),
                exit_code: Some(3),
            }),
        ];

        for err in errors {
            assert_eq!(err.to_exit_code(), ExitCode::FAILURE, "{err}");
        }
    }
}
