//! Logging and observability infrastructure for stackup
//!
//! Tracing output goes to stderr so it never interleaves with the
//! operator-facing progress lines and summary on stdout.

use tracing::{debug, error, info, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::types::RunState;

/// Initialize the tracing subscriber.
///
/// Compact format by default; verbose adds targets and span close events.
/// `RUST_LOG` takes precedence over both.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("stackup=debug,info")
            } else {
                EnvFilter::try_new("stackup=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Span wrapping one phase attempt.
pub fn phase_span(id: &str, position: usize, total: usize) -> tracing::Span {
    tracing::info_span!("phase", id = %id, position, total)
}

pub fn log_phase_start(id: &str, position: usize, total: usize) {
    info!(phase = %id, position, total, "Starting phase");
}

pub fn log_phase_complete(id: &str, duration_ms: u128) {
    info!(phase = %id, duration_ms = %duration_ms, "Phase completed");
}

pub fn log_phase_skipped(id: &str) {
    info!(phase = %id, "Phase skipped");
}

pub fn log_phase_error(id: &str, error: &str, duration_ms: u128) {
    error!(
        phase = %id,
        duration_ms = %duration_ms,
        error = %error,
        "Phase failed"
    );
}

pub fn log_state_transition(from: RunState, to: RunState) {
    debug!(from = %from, to = %to, "Orchestrator state transition");
}

pub fn log_unmatched_skip_token(token: &str) {
    warn!(token = %token, "Skip token matches no registered phase; ignoring");
}

pub fn log_probe_unavailable(probe: &str, reason: &str) {
    debug!(probe = %probe, reason = %reason, "Probe unavailable");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_helpers_do_not_panic_without_subscriber() {
        let span = phase_span("01-prerequisites", 1, 14);
        let _guard = span.enter();
        log_phase_start("01-prerequisites", 1, 14);
        log_phase_complete("01-prerequisites", 42);
        log_phase_skipped("02-docker");
        log_phase_error("03-kubernetes", "exit code 1", 7);
        log_state_transition(RunState::Initializing, RunState::Validating);
        log_unmatched_skip_token("nope");
        log_probe_unavailable("gpu", "nvidia-smi not found");
    }

    #[test]
    fn test_init_tracing_second_call_errors_instead_of_panicking() {
        let _ = init_tracing(false);
        assert!(init_tracing(true).is_err());
    }
}
