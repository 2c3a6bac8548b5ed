//! Error types for envdoc operations.
//!
//! This module defines [`EnvdocError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `EnvdocError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `EnvdocError::Other`) for unexpected errors
//! - All errors should provide actionable messages for users

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for envdoc operations.
#[derive(Debug, Error)]
pub enum EnvdocError {
    /// Manifest file not found at expected location.
    #[error("Manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    /// Failed to parse a manifest file.
    #[error("Failed to parse manifest at {path}: {message}")]
    ManifestParseError { path: PathBuf, message: String },

    /// A package requirement could not be understood.
    #[error("Invalid requirement '{requirement}': {message}")]
    InvalidRequirement {
        requirement: String,
        message: String,
    },

    /// Rendering a manifest and parsing it back gave a different structure.
    #[error("Round-trip mismatch for {path}: {message}")]
    RoundTripMismatch { path: PathBuf, message: String },

    /// A build job command exited non-zero.
    #[error("Build job failed in {phase}: {command} (exit code {code:?})")]
    JobFailed {
        phase: String,
        command: String,
        code: Option<i32>,
    },

    /// A shell command could not be started.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// Invalid project settings file.
    #[error("Invalid settings in {path}: {message}")]
    SettingsError { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for envdoc operations.
pub type Result<T> = std::result::Result<T, EnvdocError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_not_found_displays_path() {
        let err = EnvdocError::ManifestNotFound {
            path: PathBuf::from("/proj/environment-dev.yml"),
        };
        assert!(err.to_string().contains("/proj/environment-dev.yml"));
    }

    #[test]
    fn parse_error_displays_path_and_message() {
        let err = EnvdocError::ManifestParseError {
            path: PathBuf::from(".readthedocs.yml"),
            message: "invalid syntax".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains(".readthedocs.yml"));
        assert!(msg.contains("invalid syntax"));
    }

    #[test]
    fn invalid_requirement_displays_requirement() {
        let err = EnvdocError::InvalidRequirement {
            requirement: ">=1.0".into(),
            message: "missing package name".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains(">=1.0"));
        assert!(msg.contains("missing package name"));
    }

    #[test]
    fn job_failed_displays_phase_command_and_code() {
        let err = EnvdocError::JobFailed {
            phase: "post_install".into(),
            command: "pip install docutils==0.20".into(),
            code: Some(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("post_install"));
        assert!(msg.contains("docutils==0.20"));
        assert!(msg.contains("Some(1)"));
    }

    #[test]
    fn round_trip_mismatch_displays_message() {
        let err = EnvdocError::RoundTripMismatch {
            path: PathBuf::from("environment.yml"),
            message: "dependency 3 differs".into(),
        };
        assert!(err.to_string().contains("dependency 3 differs"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: EnvdocError = io_err.into();
        assert!(matches!(err, EnvdocError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(EnvdocError::SettingsError {
                path: PathBuf::from(".envdoc.yml"),
                message: "test".into(),
            })
        }
        assert!(returns_error().is_err());
    }
}
