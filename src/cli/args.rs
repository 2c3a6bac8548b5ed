//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::PathOverrides;
use crate::lint::OutputFormat;
use crate::manifest::JobPhase;

/// envdoc - Validate and replay conda environment and docs build manifests.
#[derive(Debug, Parser)]
#[command(name = "envdoc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Environment manifest (overrides discovery and .envdoc.yml)
    #[arg(long, global = true, env = "ENVDOC_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Docs build manifest (overrides discovery and .envdoc.yml)
    #[arg(long, global = true, env = "ENVDOC_DOCS_FILE")]
    pub docs_file: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Manifest paths given on the command line.
    pub fn path_overrides(&self) -> PathOverrides {
        PathOverrides {
            env_file: self.env_file.clone(),
            docs_file: self.docs_file.clone(),
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check the manifests for problems (default if no command specified)
    Lint(LintArgs),

    /// Show the parsed manifests
    Show(ShowArgs),

    /// Print normalized manifests
    Fmt(FmtArgs),

    /// Replay the docs build install order
    Replay(ReplayArgs),

    /// Run the docs build job phases
    Jobs(JobsArgs),

    /// Print the JSON Schema of a manifest
    Schema(SchemaArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `lint` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LintArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `show` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `fmt` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct FmtArgs {
    /// Exit 1 if a manifest is not already normalized
    #[arg(long)]
    pub check: bool,
}

/// Arguments for the `replay` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ReplayArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `jobs` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct JobsArgs {
    /// Run only these phases (repeatable)
    #[arg(long = "phase", value_name = "PHASE")]
    pub phases: Vec<JobPhase>,

    /// Print commands without executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Manifest whose schema to print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SchemaTarget {
    /// Conda environment manifest
    #[default]
    Env,
    /// Docs build manifest
    Docs,
    /// envdoc settings file
    Settings,
}

/// Arguments for the `schema` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SchemaArgs {
    #[arg(value_enum, default_value_t = SchemaTarget::Env)]
    pub target: SchemaTarget,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
