use std::io::Write;
use std::time::Duration;

use stackup_phases::PhaseDescriptor;

/// Prints `[i/N] (pp%)` lines for the operator.
///
/// Purely observational. Write errors are swallowed so a closed stdout
/// cannot change the outcome of a run.
pub struct ProgressReporter<W: Write> {
    out: W,
    total: usize,
}

impl<W: Write> ProgressReporter<W> {
    pub fn new(out: W, total: usize) -> Self {
        Self { out, total }
    }

    /// Integer percentage for `position`, rounded down.
    #[must_use]
    pub fn percent(&self, position: usize) -> usize {
        if self.total == 0 {
            return 100;
        }
        position * 100 / self.total
    }

    fn prefix(&self, position: usize) -> String {
        format!("[{position}/{}] ({}%)", self.total, self.percent(position))
    }

    pub fn report_start(&mut self, phase: &PhaseDescriptor) {
        let line = format!(
            "{} {} — {}",
            self.prefix(phase.position()),
            phase.id(),
            phase.description()
        );
        let _ = writeln!(self.out, "{line}");
        let _ = self.out.flush();
    }

    pub fn report_skip(&mut self, phase: &PhaseDescriptor) {
        let line = format!("{} {} skipped", self.prefix(phase.position()), phase.id());
        let _ = writeln!(self.out, "{line}");
        let _ = self.out.flush();
    }

    pub fn report_complete(&mut self, phase: &PhaseDescriptor, elapsed: Duration) {
        let _ = writeln!(
            self.out,
            "    {} done in {:.1}s",
            phase.id(),
            elapsed.as_secs_f64()
        );
        let _ = self.out.flush();
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackup_phases::{PhaseRegistry, PhaseSpec};
    use std::io;

    fn registry() -> PhaseRegistry {
        PhaseRegistry::new(vec![
            PhaseSpec::new("01-prerequisites", "Packages"),
            PhaseSpec::new("02-docker", "Container runtime"),
            PhaseSpec::new("03-kubernetes", "Cluster"),
        ])
        .unwrap()
    }

    #[test]
    fn test_start_and_skip_lines() {
        let r = registry();
        let mut reporter = ProgressReporter::new(Vec::new(), r.len());
        reporter.report_start(r.get("01-prerequisites").unwrap());
        reporter.report_skip(r.get("02-docker").unwrap());
        reporter.report_start(r.get("03-kubernetes").unwrap());

        let out = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[1/3] (33%) 01-prerequisites — Packages",
                "[2/3] (66%) 02-docker skipped",
                "[3/3] (100%) 03-kubernetes — Cluster",
            ]
        );
    }

    #[test]
    fn test_percent_rounds_down() {
        let reporter = ProgressReporter::new(io::sink(), 14);
        assert_eq!(reporter.percent(1), 7);
        assert_eq!(reporter.percent(7), 50);
        assert_eq!(reporter.percent(13), 92);
        assert_eq!(reporter.percent(14), 100);
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_write_errors_are_ignored() {
        let r = registry();
        let mut reporter = ProgressReporter::new(Broken, r.len());
        reporter.report_start(r.get("01-prerequisites").unwrap());
        reporter.report_skip(r.get("02-docker").unwrap());
        reporter.report_complete(r.get("03-kubernetes").unwrap(), Duration::from_secs(1));
    }
}
