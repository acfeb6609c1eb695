//! Execution context for task running
//!
//! The context carries everything a single run needs: workspace root, the
//! active file, an environment snapshot, the working directory and the output
//! verbosity. It is built per invocation and never shared between runs.

use colored::Colorize;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

/// Execution context for one run
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Workspace root (`${workspaceFolder}`)
    pub workspace_folder: PathBuf,

    /// Active file as given on the command line (`${file}`)
    pub file: Option<PathBuf>,

    /// Environment snapshot used for `${env:NAME}` and inherited by children
    pub env: HashMap<String, String>,

    /// Working directory (`${cwd}`), also the default for shell/process tasks
    pub cwd: PathBuf,

    /// Verbosity level
    pub verbosity: Verbosity,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet = 0,
    #[default]
    Normal = 1,
    Verbose = 2,
}

impl ExecutionContext {
    /// Create a context for a workspace, snapshotting the process environment
    /// and current directory
    pub fn new(workspace_folder: impl Into<PathBuf>) -> Self {
        ExecutionContext {
            workspace_folder: workspace_folder.into(),
            file: None,
            env: env::vars().collect(),
            cwd: env::current_dir().unwrap_or_default(),
            verbosity: Verbosity::Normal,
        }
    }

    /// Set the active file
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set the active file when one is given
    pub fn with_optional_file(mut self, file: Option<PathBuf>) -> Self {
        self.file = file.filter(|f| !f.as_os_str().is_empty());
        self
    }

    /// Replace the environment snapshot
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Set a single environment variable in the snapshot
    pub fn set_env_var(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env.insert(key.into(), value.into());
    }

    /// Get an environment variable from the snapshot
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// Merge variables from a dotenv file into the snapshot
    ///
    /// Values from the file override inherited ones.
    pub fn load_env_file(&mut self, path: &Path) -> dotenvy::Result<()> {
        for item in dotenvy::from_path_iter(path)? {
            let (key, value) = item?;
            self.env.insert(key, value);
        }
        Ok(())
    }

    /// Set the working directory
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", "[INFO]".cyan(), message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("{} {}", "[ERROR]".red().bold(), message);
    }

    /// Print debug message (only in verbose mode)
    pub fn print_debug(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{} {}", "[DEBUG]".dimmed(), message);
        }
    }

    /// Print task start message
    pub fn print_task_start(&self, label: &str) {
        self.print_info(&format!("Executing task: {}", label.bold()));
    }

    /// Print task complete message
    pub fn print_task_complete(&self, label: &str) {
        self.print_debug(&format!("Task completed: {}", label));
    }
}
