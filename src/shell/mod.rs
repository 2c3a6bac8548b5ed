//! Shell command and build-job execution.

pub mod command;
pub mod jobs;
pub mod platform;

pub use command::{execute, CommandOptions, CommandResult};
pub use jobs::{JobFilter, JobReport, JobRunner, PlannedJob};
pub use platform::{detect_shell, is_ci};
