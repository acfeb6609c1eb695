//! Task execution engine
//!
//! This module handles task records, variable substitution, command
//! construction, dependency resolution and process execution.

pub mod command;
pub mod context;
pub mod executor;
pub mod interpolate;
pub mod resolver;
pub mod task;

// Re-export main types
pub use command::*;
pub use context::*;
pub use executor::*;
pub use interpolate::*;
pub use resolver::*;
pub use task::*;
