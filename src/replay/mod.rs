//! Install replay.
//!
//! Build jobs are shell commands, so the package state the docs build ends
//! up with depends on the order those commands run in. This module reads the
//! commands without executing them and tracks which install wins for every
//! package.

pub mod command;
pub mod state;

pub use command::{InstallCommand, InstallTarget, Installer, PackageAction, ShellStep};
pub use state::{replay, InstallRecord, Override, ReplayReport, ReplayStep};
