use std::path::PathBuf;

use serde::Serialize;
use stackup_runner::CommandSpec;

/// Where an inspection reads its output from.
#[derive(Debug, Clone, PartialEq)]
pub enum InspectionSource {
    /// A read-only command, run with the collector's timeout.
    Command(CommandSpec),
    /// A directory whose entries are listed by name.
    Directory(PathBuf),
}

/// One read-only look at the machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub title: String,
    pub source: InspectionSource,
    /// Keep only output lines containing this text.
    pub filter: Option<String>,
    /// Shown instead of output when the inspection yields nothing usable.
    pub placeholder: String,
}

impl Inspection {
    pub fn command(
        title: impl Into<String>,
        cmd: CommandSpec,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            source: InspectionSource::Command(cmd),
            filter: None,
            placeholder: placeholder.into(),
        }
    }

    pub fn directory(
        title: impl Into<String>,
        path: impl Into<PathBuf>,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            source: InspectionSource::Directory(path.into()),
            filter: None,
            placeholder: placeholder.into(),
        }
    }

    #[must_use]
    pub fn filtered(mut self, needle: impl Into<String>) -> Self {
        self.filter = Some(needle.into());
        self
    }

    /// Apply the line filter. `None` when nothing is left.
    #[must_use]
    pub fn select(&self, output: &str) -> Option<String> {
        let kept: Vec<&str> = match &self.filter {
            Some(needle) => output.lines().filter(|l| l.contains(needle.as_str())).collect(),
            None => output.lines().collect(),
        };
        let text = kept.join("\n");
        if text.trim().is_empty() { None } else { Some(text) }
    }

    /// Placeholder text annotated with why the inspection was unavailable.
    #[must_use]
    pub fn unavailable(&self, reason: &str) -> InspectionOutcome {
        InspectionOutcome::Unavailable(format!("{} ({reason})", self.placeholder))
    }
}

/// Result of one inspection. Never an error: failure is a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum InspectionOutcome {
    Captured(String),
    Unavailable(String),
}

impl InspectionOutcome {
    #[must_use]
    pub fn is_captured(&self) -> bool {
        matches!(self, Self::Captured(_))
    }

    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Captured(text) | Self::Unavailable(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectionResult {
    pub title: String,
    #[serde(flatten)]
    pub outcome: InspectionOutcome,
}
