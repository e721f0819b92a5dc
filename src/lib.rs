//! stackup - take a bare machine to a running platform in one invocation
//!
//! The platform is built by an ordered list of phases, each an opaque
//! executable under `scripts/` in the installation root. stackup loads and
//! validates the environment file, runs every phase in order, stops at
//! the first failure with a diagnostic snapshot of the machine, and on
//! success prints where the platform can be reached.
//!
//! # Quick Start
//!
//! ```bash
//! cp .env.example .env && $EDITOR .env
//!
//! # Run everything
//! stackup
//!
//! # Re-run, bypassing phases that already completed
//! stackup --skip prerequisites --skip docker
//!
//! # See what would run
//! stackup --dry-run --skip docker
//! ```
//!
//! # Crates
//!
//! | Crate | Concern |
//! |-------|---------|
//! | `stackup-config` | environment file loading and required-key validation |
//! | `stackup-phases` | the phase registry and skip resolution |
//! | `stackup-engine` | sequencing, fail-fast execution, progress |
//! | `stackup-doctor` | the diagnostic snapshot taken on failure |
//! | `stackup-summary` | external address, optional features, final report |
//! | `stackup-runner` | argv-only process execution with timeouts |
//! | `stackup-utils` | errors, exit codes, logging |

pub mod cli;

pub use stackup_config::Config;
pub use stackup_engine::{Orchestrator, RunPlan, ScriptExecutor};
pub use stackup_phases::{PhaseDescriptor, PhaseRegistry, SkipSet};
pub use stackup_utils::error::{StackupError, UserFriendlyError};
pub use stackup_utils::exit_codes::ExitCode;
