//! The run/skip decision for every registered phase, computed without
//! executing anything. Backs `--dry-run` and its JSON form.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use stackup_phases::{PhaseRegistry, SkipSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedPhase {
    pub position: usize,
    pub id: String,
    pub alias: String,
    pub description: String,
    pub executable: PathBuf,
    /// Whether the executable exists right now. A missing one would fail
    /// the real run at this position.
    pub executable_present: bool,
    pub skip: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunPlan {
    pub root: PathBuf,
    pub total: usize,
    pub phases: Vec<PlannedPhase>,
    pub unmatched_skip_tokens: Vec<String>,
}

impl RunPlan {
    pub fn build(registry: &PhaseRegistry, skip: &SkipSet, root: &Path) -> Self {
        let phases = registry
            .iter()
            .map(|phase| {
                let executable = phase.resolve(root);
                PlannedPhase {
                    position: phase.position(),
                    id: phase.id().to_string(),
                    alias: phase.alias().to_string(),
                    description: phase.description().to_string(),
                    executable_present: executable.is_file(),
                    executable,
                    skip: skip.should_skip(phase),
                }
            })
            .collect();

        Self {
            root: root.to_path_buf(),
            total: registry.len(),
            phases,
            unmatched_skip_tokens: skip
                .unmatched(registry)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Phases that would actually be executed.
    pub fn runnable(&self) -> impl Iterator<Item = &PlannedPhase> {
        self.phases.iter().filter(|p| !p.skip)
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "Plan for {} ({} phases)", self.root.display(), self.total)?;
        for phase in &self.phases {
            let action = if phase.skip {
                "skip"
            } else if phase.executable_present {
                "run "
            } else {
                "MISSING"
            };
            writeln!(
                out,
                "  [{}/{}] {:<7} {}  {}",
                phase.position, self.total, action, phase.id, phase.description
            )?;
        }
        for token in &self.unmatched_skip_tokens {
            writeln!(out, "  note: skip token '{token}' matches no phase")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackup_phases::PhaseSpec;
    use std::fs;
    use tempfile::TempDir;

    fn registry() -> PhaseRegistry {
        PhaseRegistry::new(vec![
            PhaseSpec::new("01-a", "first"),
            PhaseSpec::new("02-b", "second"),
            PhaseSpec::new("03-c", "third"),
        ])
        .unwrap()
    }

    #[test]
    fn test_plan_marks_skips_and_missing_executables() {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("scripts")).unwrap();
        fs::write(root.path().join("scripts/01-a.sh"), "#!/bin/sh\n").unwrap();

        let plan = RunPlan::build(
            &registry(),
            &SkipSet::from_tokens(["b", "zz"]),
            root.path(),
        );

        assert_eq!(plan.total, 3);
        assert!(plan.phases[0].executable_present);
        assert!(!plan.phases[2].executable_present);
        assert!(plan.phases[1].skip);
        assert_eq!(
            plan.runnable().map(|p| p.id.as_str()).collect::<Vec<_>>(),
            vec!["01-a", "03-c"]
        );
        assert_eq!(plan.unmatched_skip_tokens, vec!["zz"]);
    }

    #[test]
    fn test_plan_render_and_json() {
        let root = TempDir::new().unwrap();
        let plan = RunPlan::build(&registry(), &SkipSet::from_tokens(["02-b"]), root.path());

        let mut out = Vec::new();
        plan.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[2/3] skip    02-b  second"));
        assert!(text.contains("[1/3] MISSING 01-a  first"));

        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["phases"][1]["skip"], true);
        assert_eq!(json["phases"][0]["alias"], "a");
    }
}
