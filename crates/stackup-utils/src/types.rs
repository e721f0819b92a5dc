//! Value types shared between the engine, the CLI and the reporters.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Terminal result of one phase attempt.
///
/// A three-state outcome, not a retry counter: the orchestrator never
/// retries a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PhaseOutcome {
    Succeeded,
    Skipped,
    Failed,
}

/// Top-level orchestrator state.
///
/// `Initializing → Validating → Running(1..N) → {Summarizing | Failing}`.
/// `Summarizing` and `Failing` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    #[strum(to_string = "initializing")]
    Initializing,
    #[strum(to_string = "validating")]
    Validating,
    #[strum(to_string = "running({position}/{total})")]
    Running { position: usize, total: usize },
    #[strum(to_string = "summarizing")]
    Summarizing,
    #[strum(to_string = "failing")]
    Failing,
}

impl RunState {
    /// Whether `next` is a legal successor of `self`.
    #[must_use]
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;
        match (self, next) {
            (Initializing, Validating) => true,
            (Validating, Running { position: 1, .. }) => true,
            (Validating, Failing) => true,
            // An empty plan is still a successful run.
            (Validating, Summarizing) => true,
            (Running { position: a, total: t }, Running { position: b, total: u }) => {
                t == u && b == a + 1 && b <= u
            }
            (Running { .. }, Summarizing | Failing) => true,
            _ => false,
        }
    }
}
