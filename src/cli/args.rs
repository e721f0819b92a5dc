//! CLI argument definitions
//!
//! The `--help` text ends with the registered phase list, so `Cli` is
//! parsed through [`build_cli`] rather than `Cli::parse()`.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use stackup_phases::PhaseRegistry;

/// stackup - bootstrap the platform on this machine, phase by phase
#[derive(Parser, Debug)]
#[command(name = "stackup")]
#[command(about = "Take a bare machine to a running platform, one phase at a time")]
#[command(long_about = r#"
stackup runs the platform's phases strictly in order, stopping at the first
failure. Every phase is safe to re-run, so after fixing a failure simply run
stackup again, optionally skipping phases that already completed.

EXAMPLES:
  # Run every phase
  stackup

  # Skip phases by full id or by name
  stackup --skip 01-prerequisites --skip docker
  stackup --skip docker,kubernetes

  # Show the plan without running anything
  stackup --dry-run --skip docker
  stackup --dry-run --json

CONFIGURATION:
  Settings are read from <root>/.env (see .env.example). DOMAIN,
  LETSENCRYPT_EMAIL, OPENAI_API_KEY and DEEPGRAM_API_KEY are required.
"#)]
#[command(version)]
pub struct Cli {
    /// Skip a phase by id (02-docker) or name (docker). Repeatable; accepts comma-separated lists
    #[arg(long, value_name = "PHASE", num_args = 1.., value_delimiter = ',', action = ArgAction::Append)]
    pub skip: Vec<String>,

    /// Installation root containing scripts/ and .env
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Environment file to load instead of <root>/.env
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Validate configuration and print the plan without running any phase
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the dry-run plan as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Do not query external services for the public address
    #[arg(long)]
    pub offline: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// The full command, with the registered phases appended to `--help`.
pub fn build_cli() -> clap::Command {
    let command = <Cli as clap::CommandFactory>::command();
    match PhaseRegistry::standard() {
        Ok(registry) => command.after_help(format!("PHASES:\n{}", registry.help_listing())),
        Err(_) => command,
    }
}
