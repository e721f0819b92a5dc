//! Top-level run loop and error boundary.
//!
//! `Initializing → Validating → Running(1..N) → {Summarizing | Failing}`.
//! The loop returns on the first fatal error. Before it does, the failure
//! hook runs, at most once and only for a phase whose child exited
//! non-zero.

use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;
use stackup_config::Config;
use stackup_phases::{PhaseDescriptor, PhaseRegistry, SkipSet};
use stackup_utils::error::{ConfigError, PhaseError, StackupError};
use stackup_utils::logging::{
    log_phase_complete, log_phase_error, log_phase_skipped, log_phase_start,
    log_state_transition, log_unmatched_skip_token, phase_span,
};
use stackup_utils::types::{PhaseOutcome, RunState};

use crate::executor::{PhaseContext, PhaseExecutor};
use crate::progress::ProgressReporter;

/// Called when a phase fails after its child ran.
pub trait FailureHook {
    fn on_phase_failure(&mut self, phase: &PhaseDescriptor, error: &PhaseError);
}

impl<F> FailureHook for F
where
    F: FnMut(&PhaseDescriptor, &PhaseError),
{
    fn on_phase_failure(&mut self, phase: &PhaseDescriptor, error: &PhaseError) {
        self(phase, error);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseRecord {
    pub id: String,
    pub position: usize,
    pub outcome: PhaseOutcome,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Per-phase results of one run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub records: Vec<PhaseRecord>,
}

impl RunReport {
    #[must_use]
    pub fn outcomes(&self) -> Vec<PhaseOutcome> {
        self.records.iter().map(|r| r.outcome).collect()
    }

    pub fn count(&self, outcome: PhaseOutcome) -> usize {
        self.records.iter().filter(|r| r.outcome == outcome).count()
    }

    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.records.iter().map(|r| r.duration).sum()
    }
}

/// A run that reached `Summarizing`.
#[derive(Debug)]
pub struct CompletedRun {
    pub config: Config,
    pub report: RunReport,
}

/// A run that reached `Failing`.
#[derive(Debug)]
pub struct RunFailure {
    pub error: StackupError,
    /// Phases attempted before the failure, including the failed one.
    pub report: RunReport,
    pub diagnostics_ran: bool,
}

pub struct Orchestrator<'a> {
    registry: &'a PhaseRegistry,
    skip: &'a SkipSet,
    root: PathBuf,
    state: RunState,
    diagnostics_ran: bool,
}

impl<'a> Orchestrator<'a> {
    pub fn new(registry: &'a PhaseRegistry, skip: &'a SkipSet, root: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            skip,
            root: root.into(),
            state: RunState::Initializing,
            diagnostics_ran: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {}",
            self.state,
            next
        );
        log_state_transition(self.state, next);
        self.state = next;
    }

    fn fail(&mut self, error: StackupError, report: RunReport) -> RunFailure {
        self.transition(RunState::Failing);
        RunFailure {
            error,
            report,
            diagnostics_ran: self.diagnostics_ran,
        }
    }

    /// Load configuration, then run every phase in position order.
    ///
    /// No executor call happens before `load_config` succeeds. An
    /// orchestrator runs once; a second call on the same value panics in
    /// debug builds.
    pub fn run<L, E, H, W>(
        &mut self,
        load_config: L,
        mut executor: E,
        mut hook: H,
        progress: &mut ProgressReporter<W>,
    ) -> Result<CompletedRun, RunFailure>
    where
        L: FnOnce() -> Result<Config, ConfigError>,
        E: PhaseExecutor,
        H: FailureHook,
        W: Write,
    {
        self.transition(RunState::Validating);

        let config = match load_config() {
            Ok(config) => config,
            Err(e) => return Err(self.fail(e.into(), RunReport::default())),
        };
        for token in self.skip.unmatched(self.registry) {
            log_unmatched_skip_token(token);
        }

        let ctx = PhaseContext::new(self.root.clone(), config);
        let total = self.registry.len();
        let mut report = RunReport::default();

        for phase in self.registry {
            self.transition(RunState::Running {
                position: phase.position(),
                total,
            });
            let span = phase_span(phase.id(), phase.position(), total);
            let _guard = span.enter();

            if self.skip.should_skip(phase) {
                progress.report_skip(phase);
                log_phase_skipped(phase.id());
                report.records.push(record(phase, PhaseOutcome::Skipped, Duration::ZERO));
                continue;
            }

            progress.report_start(phase);
            log_phase_start(phase.id(), phase.position(), total);
            let started = Instant::now();

            match executor.execute(phase, &ctx) {
                Ok(()) => {
                    let elapsed = started.elapsed();
                    log_phase_complete(phase.id(), elapsed.as_millis());
                    progress.report_complete(phase, elapsed);
                    report.records.push(record(phase, PhaseOutcome::Succeeded, elapsed));
                }
                Err(e) => {
                    let elapsed = started.elapsed();
                    log_phase_error(phase.id(), &e.to_string(), elapsed.as_millis());
                    report.records.push(record(phase, PhaseOutcome::Failed, elapsed));
                    if e.wants_diagnostics() && !self.diagnostics_ran {
                        self.diagnostics_ran = true;
                        hook.on_phase_failure(phase, &e);
                    }
                    drop(_guard);
                    return Err(self.fail(e.into(), report));
                }
            }
        }

        self.transition(RunState::Summarizing);
        Ok(CompletedRun {
            config: ctx.config,
            report,
        })
    }
}

fn record(phase: &PhaseDescriptor, outcome: PhaseOutcome, duration: Duration) -> PhaseRecord {
    PhaseRecord {
        id: phase.id().to_string(),
        position: phase.position(),
        outcome,
        duration,
    }
}
