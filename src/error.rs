//! Error types for the Debian packager
//!
//! Provides structured error handling with context and proper error chains.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the Debian packager
#[derive(Error, Debug)]
pub enum DebError {
    /// The version source file is missing, unreadable, or has no version line
    #[error("Version source error: {message}")]
    VersionSource {
        message: String,
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Control template references an unknown field or is malformed
    #[error("Control template error: {message}")]
    Template {
        message: String,
        field: Option<String>,
    },

    /// The package root is left over from a previous or concurrent run
    #[error("Package root directory \"{}\" already exists", path.display())]
    StagingExists { path: PathBuf },

    /// File system operation errors
    #[error("File system error: {operation} failed on {}", path.display())]
    FileSystem {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Process execution errors
    #[error("Process error: {command} failed ({})", describe_exit(*exit_code))]
    Process {
        command: String,
        exit_code: Option<i32>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The packaging tool succeeded but the artifact is missing
    #[error("Artifact error: {message}")]
    Artifact { message: String, path: PathBuf },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },
}

fn describe_exit(exit_code: Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code".to_string(),
    }
}

impl DebError {
    /// Create a new version source error
    pub fn version_source<P: Into<PathBuf>>(message: impl Into<String>, path: P) -> Self {
        Self::VersionSource {
            message: message.into(),
            path: path.into(),
            source: None,
        }
    }

    /// Create a version source error caused by an I/O failure
    pub fn version_source_io<P: Into<PathBuf>>(
        message: impl Into<String>,
        path: P,
        source: std::io::Error,
    ) -> Self {
        Self::VersionSource {
            message: message.into(),
            path: path.into(),
            source: Some(source),
        }
    }

    /// Create a new template error
    pub fn template(message: impl Into<String>, field: Option<&str>) -> Self {
        Self::Template {
            message: message.into(),
            field: field.map(str::to_string),
        }
    }

    /// Create a new staging-exists error
    pub fn staging_exists<P: Into<PathBuf>>(path: P) -> Self {
        Self::StagingExists { path: path.into() }
    }

    /// Create a new file system error
    pub fn file_system<P: Into<PathBuf>>(
        operation: impl Into<String>,
        path: P,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a new process error for a command that ran and failed
    pub fn process(command: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::Process {
            command: command.into(),
            exit_code,
            source: None,
        }
    }

    /// Create a new process error for a command that could not be started
    pub fn process_spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Process {
            command: command.into(),
            exit_code: None,
            source: Some(source),
        }
    }

    /// Create a new artifact error
    pub fn artifact<P: Into<PathBuf>>(message: impl Into<String>, path: P) -> Self {
        Self::Artifact {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DebError>;
