//! Tasks file loading and validation
//!
//! This module finds and parses `.vscode/tasks.json` files, lints them,
//! and writes starter templates.

pub mod parse;
pub mod schema;
pub mod template;
pub mod types;

// Re-export main types
pub use parse::*;
pub use schema::*;
pub use template::*;
pub use types::*;
