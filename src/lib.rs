//! taskjson - run VS Code `tasks.json` tasks from the command line
//!
//! Loads `.vscode/tasks.json`, resolves `${...}` variables, orders tasks by
//! their `dependsOn` declarations and runs them as child processes.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod runner;
pub mod watch;

// Re-export commonly used types
pub use error::{ConfigError, ExecutionError, ResolveError};

/// Current version of taskjson
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
