use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use stackup_runner::{ProcessRunner, run_probe};
use stackup_utils::logging::log_probe_unavailable;

use crate::battery::standard_battery;
use crate::inspection::{Inspection, InspectionOutcome, InspectionResult, InspectionSource};

/// Per-inspection bound, so an unreachable API server cannot hang triage.
pub const DEFAULT_INSPECTION_TIMEOUT: Duration = Duration::from_secs(15);

/// Runs the inspection battery through a [`ProcessRunner`].
pub struct DiagnosticsCollector<R> {
    runner: R,
    inspections: Vec<Inspection>,
    timeout: Duration,
}

impl<R: ProcessRunner> DiagnosticsCollector<R> {
    pub fn new(runner: R, inspections: Vec<Inspection>) -> Self {
        Self {
            runner,
            inspections,
            timeout: DEFAULT_INSPECTION_TIMEOUT,
        }
    }

    /// Collector for the built-in battery of a platform installed at `root`.
    pub fn standard(runner: R, root: &Path) -> Self {
        Self::new(runner, standard_battery(root))
    }

    #[must_use]
    pub fn inspections(&self) -> &[Inspection] {
        &self.inspections
    }

    /// Run one inspection. Never fails.
    pub fn inspect(&self, inspection: &Inspection) -> InspectionOutcome {
        let raw = match &inspection.source {
            InspectionSource::Command(cmd) => {
                run_probe(&self.runner, cmd, self.timeout).map_err(|e| e.to_string())
            }
            InspectionSource::Directory(dir) => list_directory(dir),
        };

        let outcome = match raw {
            Ok(output) => match inspection.select(&output) {
                Some(text) => InspectionOutcome::Captured(text),
                None => inspection.unavailable("no matching output"),
            },
            Err(reason) => inspection.unavailable(&reason),
        };

        if let InspectionOutcome::Unavailable(text) = &outcome {
            log_probe_unavailable(&inspection.title, text);
        }
        outcome
    }

    /// Run the whole battery in order.
    pub fn collect(&self, failed_phase: Option<&str>) -> DiagnosticSnapshot {
        tracing::info!(
            inspections = self.inspections.len(),
            phase = failed_phase.unwrap_or("-"),
            "Capturing diagnostic snapshot"
        );
        let results = self
            .inspections
            .iter()
            .map(|inspection| InspectionResult {
                title: inspection.title.clone(),
                outcome: self.inspect(inspection),
            })
            .collect();

        DiagnosticSnapshot {
            captured_at: Utc::now(),
            failed_phase: failed_phase.map(str::to_string),
            results,
        }
    }
}

fn list_directory(dir: &Path) -> Result<String, String> {
    let entries = fs::read_dir(dir).map_err(|e| format!("{}: {e}", dir.display()))?;
    let mut names: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names.join("\n"))
}

/// Everything the battery saw, in battery order. Printed once and dropped.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticSnapshot {
    pub captured_at: DateTime<Utc>,
    pub failed_phase: Option<String>,
    pub results: Vec<InspectionResult>,
}

impl DiagnosticSnapshot {
    #[must_use]
    pub fn captured_count(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_captured()).count()
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out)?;
        match &self.failed_phase {
            Some(phase) => writeln!(
                out,
                "=== Diagnostic snapshot after {phase} failed ({}) ===",
                self.captured_at.format("%Y-%m-%d %H:%M:%S UTC")
            )?,
            None => writeln!(
                out,
                "=== Diagnostic snapshot ({}) ===",
                self.captured_at.format("%Y-%m-%d %H:%M:%S UTC")
            )?,
        }
        for result in &self.results {
            writeln!(out)?;
            writeln!(out, "--- {} ---", result.title)?;
            match &result.outcome {
                InspectionOutcome::Captured(text) => writeln!(out, "{text}")?,
                InspectionOutcome::Unavailable(text) => writeln!(out, "  {text}")?,
            }
        }
        writeln!(out)?;
        writeln!(
            out,
            "{} of {} inspections captured output",
            self.captured_count(),
            self.results.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackup_runner::{CommandSpec, ProcessOutput, RunnerError};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// Answers by program name; unknown programs are "not installed".
    #[derive(Default)]
    struct FakeRunner {
        answers: HashMap<String, Result<ProcessOutput, u64>>,
        seen: RefCell<Vec<String>>,
    }

    impl FakeRunner {
        fn stdout(mut self, line: &str, stdout: &str) -> Self {
            self.answers.insert(
                line.to_string(),
                Ok(ProcessOutput::new(stdout.as_bytes().to_vec(), vec![], Some(0))),
            );
            self
        }

        fn exit(mut self, line: &str, code: i32) -> Self {
            self.answers.insert(
                line.to_string(),
                Ok(ProcessOutput::new(vec![], b"boom".to_vec(), Some(code))),
            );
            self
        }

        fn hang(mut self, line: &str) -> Self {
            self.answers.insert(line.to_string(), Err(15));
            self
        }
    }

    impl ProcessRunner for FakeRunner {
        fn run(&self, cmd: &CommandSpec, _: Duration) -> Result<ProcessOutput, RunnerError> {
            let line = cmd.display_line();
            self.seen.borrow_mut().push(line.clone());
            match self.answers.get(&line) {
                Some(Ok(out)) => Ok(out.clone()),
                Some(Err(secs)) => Err(RunnerError::Timeout {
                    timeout: Duration::from_secs(*secs),
                }),
                None => Err(RunnerError::ProgramNotFound {
                    program: cmd.program_name(),
                }),
            }
        }
    }

    #[test]
    fn test_every_inspection_runs_even_when_all_fail() {
        let root = TempDir::new().unwrap();
        let collector = DiagnosticsCollector::standard(FakeRunner::default(), root.path());
        let snapshot = collector.collect(Some("03-kubernetes"));

        assert_eq!(snapshot.results.len(), 10);
        assert_eq!(snapshot.captured_count(), 0);
        assert_eq!(collector.runner.seen.borrow().len(), 9);
        assert!(
            snapshot.results[0]
                .outcome
                .text()
                .starts_with("Cluster not reachable (kubectl is not installed")
        );
    }

    #[test]
    fn test_mixed_outcomes_degrade_independently() {
        let root = TempDir::new().unwrap();
        let runner = FakeRunner::default()
            .stdout("kubectl get nodes -o wide", "node-1 Ready\n")
            .exit("kubectl get namespaces", 1)
            .hang("kubectl get pods -n cert-manager")
            .stdout(
                "kubectl get crd",
                "NAME\ncertificates.cert-manager.io\nfoo.example.io\n",
            )
            .stdout("nvidia-smi -L", "GPU 0: NVIDIA A10\n");
        let snapshot = DiagnosticsCollector::standard(runner, root.path()).collect(None);

        let by_title = |title: &str| {
            snapshot
                .results
                .iter()
                .find(|r| r.title == title)
                .map(|r| r.outcome.clone())
                .unwrap()
        };
        assert_eq!(
            by_title("Cluster nodes"),
            InspectionOutcome::Captured("node-1 Ready".to_string())
        );
        assert!(by_title("Namespaces").text().contains("exited with code 1"));
        assert!(by_title("cert-manager pods").text().contains("timed out after 15s"));
        assert_eq!(
            by_title("Certificate CRDs"),
            InspectionOutcome::Captured("certificates.cert-manager.io".to_string())
        );
        assert!(by_title("GPU hardware").is_captured());
        assert_eq!(snapshot.captured_count(), 3);
    }

    #[test]
    fn test_directory_inspection_lists_sorted_entries() {
        let root = TempDir::new().unwrap();
        let backups = root.path().join("backups/certificates");
        fs::create_dir_all(&backups).unwrap();
        fs::write(backups.join("wildcard.crt"), "x").unwrap();
        fs::write(backups.join("auth.crt"), "x").unwrap();

        let collector = DiagnosticsCollector::standard(FakeRunner::default(), root.path());
        let backups_inspection = &collector.inspections()[5];
        assert_eq!(
            collector.inspect(backups_inspection),
            InspectionOutcome::Captured("auth.crt\nwildcard.crt".to_string())
        );
    }

    #[test]
    fn test_empty_backup_directory_is_unavailable() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("backups/certificates")).unwrap();
        let collector = DiagnosticsCollector::standard(FakeRunner::default(), root.path());
        let outcome = collector.inspect(&collector.inspections()[5]);
        assert_eq!(
            outcome,
            InspectionOutcome::Unavailable(
                "No certificate backups found (no matching output)".to_string()
            )
        );
    }

    #[test]
    fn test_render_lists_every_section() {
        let root = TempDir::new().unwrap();
        let runner = FakeRunner::default().stdout("tailscale status", "100.64.0.1 node");
        let snapshot = DiagnosticsCollector::standard(runner, root.path()).collect(Some("09-headscale"));

        let mut out = Vec::new();
        snapshot.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("=== Diagnostic snapshot after 09-headscale failed"));
        assert!(text.contains("--- VPN status ---\n100.64.0.1 node"));
        assert!(text.contains("--- GPU hardware ---\n  No NVIDIA GPU detected"));
        assert!(text.contains("1 of 10 inspections captured output"));
    }

    #[test]
    fn test_snapshot_serializes() {
        let root = TempDir::new().unwrap();
        let snapshot =
            DiagnosticsCollector::standard(FakeRunner::default(), root.path()).collect(Some("01-a"));
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["failed_phase"], "01-a");
        assert_eq!(json["results"].as_array().unwrap().len(), 10);
        assert_eq!(json["results"][0]["status"], "unavailable");
    }
}
