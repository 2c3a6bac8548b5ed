//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`envdoc lint`, `envdoc replay`)
//! - Shared manifest loading and error reporting
//! - Consistent global flag handling

pub mod completions;
pub mod dispatcher;
pub mod fmt;
pub mod jobs;
pub mod lint;
pub mod replay;
pub mod schema;
pub mod show;

pub use dispatcher::{Command, CommandDispatcher, CommandResult, EXIT_NO_MANIFEST};
