//! Phase orchestration engine
//!
//! Runs the registered phases strictly in order, one child process at a
//! time, stopping at the first failure. The engine knows nothing about
//! what a phase does; it only interprets exit status.
//!
//! - `executor`: the [`PhaseExecutor`] seam and the script-based implementation
//! - `progress`: `[i/N]` progress lines
//! - `orchestrator`: the top-level state machine and error boundary
//! - `plan`: the run/skip decision for every phase, without executing anything

pub mod executor;
pub mod orchestrator;
pub mod plan;
pub mod progress;

pub use executor::{PhaseContext, PhaseExecutor, ScriptExecutor};
pub use orchestrator::{
    CompletedRun, FailureHook, Orchestrator, PhaseRecord, RunFailure, RunReport,
};
pub use plan::{PlannedPhase, RunPlan};
pub use progress::ProgressReporter;
