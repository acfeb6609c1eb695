//! Error types for taskjson

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Tasks file discovery and parsing errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("tasks.json not found in current directory or any parent directory (searched: {0})")]
    NotFound(String),

    #[error("Specified config file not found: {}", .0.display())]
    SpecifiedNotFound(PathBuf),

    #[error("Failed to read tasks file '{}': {error}", path.display())]
    Read { path: PathBuf, error: String },

    #[error("Failed to write '{}': {error}", path.display())]
    Write { path: PathBuf, error: String },

    #[error("Failed to parse tasks file '{}': {error}", path.display())]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Task '{0}' not found")]
    TaskNotFound(String),

    #[error("File already exists: {} (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Invalid template '{0}'. Available templates: default, go, node")]
    UnknownTemplate(String),
}

/// Dependency resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Task '{0}' not found")]
    TaskNotFound(String),

    #[error("Circular dependency detected: task '{0}' depends on itself")]
    CircularDependency(String),
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Unsupported task type: {0}")]
    UnsupportedTaskType(String),

    #[error("Invalid task: {0}")]
    InvalidTask(String),

    #[error("Failed to launch '{program}'")]
    ProcessLaunchFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Command failed with exit code {}", exit_code_display(.0))]
    NonZeroExit(Option<i32>),

    #[error("Failed to resolve dependencies")]
    DependencyResolutionFailed(#[from] ResolveError),

    #[error("Task '{label}' failed")]
    TaskExecutionFailed {
        label: String,
        #[source]
        source: Box<ExecutionError>,
    },
}

fn exit_code_display(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for dependency resolution
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;
