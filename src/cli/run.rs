//! CLI entry point
//!
//! `run()` owns ALL operator output: progress and the summary go to
//! stdout, the failure banner goes to stderr, tracing goes to stderr.
//! Library crates never print errors or exit.

use clap::FromArgMatches;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use stackup_config::{Config, DEFAULT_ENV_FILE};
use stackup_doctor::{DiagnosticSnapshot, DiagnosticsCollector};
use stackup_engine::{
    CompletedRun, Orchestrator, ProgressReporter, RunFailure, RunPlan, ScriptExecutor,
};
use stackup_phases::{PhaseDescriptor, PhaseRegistry, SkipSet};
use stackup_runner::NativeRunner;
use stackup_summary::{AddressDetector, DetectedAddress, FeatureProbe, SummaryReport};
use stackup_utils::error::{PhaseError, StackupError};
use stackup_utils::exit_codes::ExitCode;
use stackup_utils::logging::{init_tracing, log_unmatched_skip_token};
use stackup_utils::types::PhaseOutcome;

use super::args::{Cli, build_cli};

/// Main CLI execution function.
///
/// Returns `Err(ExitCode)` after the error has been printed; `main` only
/// maps it to the process exit status.
pub fn run() -> Result<(), ExitCode> {
    let Some(cli) = parse_args(std::env::args_os())? else {
        return Ok(());
    };

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    execute(&cli)
}

/// Parse `args` with clap, printing whatever clap has to say.
///
/// `Ok(None)` means `--help` or `--version` was answered; usage errors
/// map to [`ExitCode::CLI_ARGS`].
pub(crate) fn parse_args<I, T>(args: I) -> Result<Option<Cli>, ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let parsed = build_cli()
        .try_get_matches_from(args)
        .and_then(|matches| Cli::from_arg_matches(&matches));
    match parsed {
        Ok(cli) => Ok(Some(cli)),
        Err(e) => {
            let _ = e.print();
            if e.use_stderr() {
                Err(ExitCode::CLI_ARGS)
            } else {
                Ok(None)
            }
        }
    }
}

/// Print the error the way every fatal error is printed and return its code.
fn report(err: &StackupError) -> ExitCode {
    eprintln!();
    eprint!("{}", err.display_for_user());
    err.to_exit_code()
}

fn execute(cli: &Cli) -> Result<(), ExitCode> {
    let registry = PhaseRegistry::standard().map_err(|e| report(&e.into()))?;
    let root = std::path::absolute(&cli.root).map_err(|e| report(&e.into()))?;
    let env_file = cli
        .env_file
        .clone()
        .unwrap_or_else(|| root.join(DEFAULT_ENV_FILE));
    let skip = SkipSet::from_tokens(&cli.skip);

    tracing::debug!(
        root = %root.display(),
        env_file = %env_file.display(),
        phases = registry.len(),
        skip_tokens = skip.len(),
        "Starting stackup"
    );

    if cli.dry_run {
        return dry_run(cli, &registry, &skip, &root, &env_file);
    }

    let runner = NativeRunner::new();
    let collector = DiagnosticsCollector::standard(runner, &root);
    let mut snapshot: Option<DiagnosticSnapshot> = None;
    let mut progress = ProgressReporter::new(io::stdout(), registry.len());

    let result = Orchestrator::new(&registry, &skip, &root).run(
        || Config::load(&env_file),
        ScriptExecutor::new(),
        |phase: &PhaseDescriptor, _: &PhaseError| {
            snapshot = Some(collector.collect(Some(phase.id())));
        },
        &mut progress,
    );

    match result {
        Ok(completed) => {
            summarize(cli, &completed, runner);
            Ok(())
        }
        Err(failure) => Err(fail(&failure, snapshot.as_ref())),
    }
}

fn dry_run(
    cli: &Cli,
    registry: &PhaseRegistry,
    skip: &SkipSet,
    root: &Path,
    env_file: &Path,
) -> Result<(), ExitCode> {
    Config::load(env_file).map_err(|e| report(&e.into()))?;
    for token in skip.unmatched(registry) {
        log_unmatched_skip_token(token);
    }

    let plan = RunPlan::build(registry, skip, root);
    let mut stdout = io::stdout().lock();
    if cli.json {
        let json = serde_json::to_string_pretty(&plan).map_err(|e| {
            report(&StackupError::Io(io::Error::other(format!(
                "failed to serialize plan: {e}"
            ))))
        })?;
        let _ = writeln!(stdout, "{json}");
    } else {
        let _ = plan.render(&mut stdout);
    }
    Ok(())
}

/// Banner on stderr, then the snapshot (if one was taken) on stdout.
fn fail(failure: &RunFailure, snapshot: Option<&DiagnosticSnapshot>) -> ExitCode {
    let code = report(&failure.error);
    if let Some(snapshot) = snapshot {
        let _ = snapshot.render(&mut io::stdout().lock());
    }
    tracing::debug!(
        attempted = failure.report.records.len(),
        diagnostics = failure.diagnostics_ran,
        "Run failed"
    );
    code
}

fn summarize(cli: &Cli, completed: &CompletedRun, runner: NativeRunner) {
    let address = detect_address(cli.offline, runner);
    tracing::debug!(known = address.is_known(), offline = cli.offline, "Address detection finished");
    let features = FeatureProbe::new(runner).detect();
    let report = SummaryReport::build(&completed.config, address, features);

    let mut stdout = io::stdout().lock();
    let _ = writeln!(
        stdout,
        "\n✓ {} phases finished in {:.0}s: {} succeeded, {} skipped",
        completed.report.records.len(),
        completed.report.total_duration().as_secs_f64(),
        completed.report.count(PhaseOutcome::Succeeded),
        completed.report.count(PhaseOutcome::Skipped),
    );
    let _ = report.render(&mut stdout);
}

/// Run the async detector on a private current-thread runtime.
fn detect_address(offline: bool, runner: NativeRunner) -> DetectedAddress {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create async runtime; address unknown");
            return DetectedAddress::Unknown;
        }
    };

    let runner = Arc::new(runner);
    let detector = if offline {
        AddressDetector::offline(runner)
    } else {
        AddressDetector::standard(runner)
    };
    runtime.block_on(detector.detect())
}
