//! Foundation utilities shared by every stackup crate
//!
//! - `error`: the error taxonomy and user-facing reporting trait
//! - `exit_codes`: process exit codes
//! - `logging`: tracing initialization and structured phase events
//! - `types`: small value types passed between crates

pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod types;

pub use error::{
    ConfigError, ErrorCategory, PhaseError, RegistryError, StackupError, UserFriendlyError,
};
pub use exit_codes::ExitCode;
pub use types::{PhaseOutcome, RunState};
