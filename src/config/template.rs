//! Starter tasks.json templates for `taskjson init`

use crate::error::{ConfigError, ConfigResult};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Names accepted by `init --template`
pub const TEMPLATE_NAMES: &[&str] = &["default", "go", "node"];

const DEFAULT_TEMPLATE: &str = include_str!("../../templates/default.json");
const GO_TEMPLATE: &str = include_str!("../../templates/go.json");
const NODE_TEMPLATE: &str = include_str!("../../templates/node.json");

/// Look up the contents of a named template
pub fn template_content(name: &str) -> ConfigResult<&'static str> {
    match name {
        "default" => Ok(DEFAULT_TEMPLATE),
        "go" => Ok(GO_TEMPLATE),
        "node" => Ok(NODE_TEMPLATE),
        other => Err(ConfigError::UnknownTemplate(other.to_string())),
    }
}

/// Write a template to `path`, creating parent directories
///
/// An existing file is only replaced when `force` is set.
pub fn write_template(name: &str, path: &Path, force: bool) -> ConfigResult<()> {
    let content = template_content(name)?;

    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }

    let io_error = |e: std::io::Error| ConfigError::Write {
        path: path.to_path_buf(),
        error: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, content).map_err(io_error)?;

    debug!(template = name, path = %path.display(), "wrote template");
    Ok(())
}
