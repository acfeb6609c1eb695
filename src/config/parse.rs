//! Tasks file parsing and discovery

use crate::config::types::TasksFile;
use crate::error::{ConfigError, ConfigResult};
use crate::runner::Task;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Location of the tasks file relative to a workspace directory
pub const TASKS_FILE_PATH: &str = ".vscode/tasks.json";

/// Find the tasks file, honouring an explicit path when one is given
pub fn find_tasks_file(config_path: Option<&Path>) -> ConfigResult<PathBuf> {
    if let Some(path) = config_path {
        if !path.exists() {
            return Err(ConfigError::SpecifiedNotFound(path.to_path_buf()));
        }
        return Ok(path.to_path_buf());
    }

    find_tasks_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the tasks file by searching a directory and its parents
pub fn find_tasks_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        let tasks_path = current_dir.join(TASKS_FILE_PATH);
        searched_paths.push(tasks_path.display().to_string());

        if tasks_path.is_file() {
            debug!(path = %tasks_path.display(), "found tasks file");
            return Ok(tasks_path);
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Find the nearest ancestor (inclusive) containing a `.git` directory
pub fn find_git_root(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .find(|dir| dir.join(".git").is_dir())
        .map(Path::to_path_buf)
}

/// Pick the workspace root: explicit folder, else git root, else the start directory
pub fn resolve_workspace_folder(explicit: Option<&Path>, start_dir: &Path) -> PathBuf {
    match explicit {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => find_git_root(start_dir).unwrap_or_else(|| start_dir.to_path_buf()),
    }
}

/// Parse a tasks file from a path
pub fn parse_tasks_file(path: &Path) -> ConfigResult<TasksFile> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    parse_tasks(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Parse a tasks file from a string (JSON with comments and trailing commas)
pub fn parse_tasks(json: &str) -> serde_json::Result<TasksFile> {
    serde_json::from_str(&strip_jsonc(json))
}

/// Load and normalise every task of a tasks file, in declaration order
pub fn load_tasks(path: &Path) -> ConfigResult<Vec<Task>> {
    let file = parse_tasks_file(path)?;
    debug!(count = file.tasks.len(), path = %path.display(), "loaded tasks");
    Ok(file.tasks.into_iter().map(Task::from_config).collect())
}

/// Convert JSONC to plain JSON
///
/// Removes `//` and `/* */` comments and trailing commas before `]` or `}`.
/// String literals are copied untouched.
pub fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            match c {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                }
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                while let Some(&next) = chars.peek() {
                    if next == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    // keep line numbers stable for error messages
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
            }
            ']' | '}' => {
                remove_trailing_comma(&mut out);
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

fn remove_trailing_comma(out: &mut String) {
    let trimmed_len = out.trim_end().len();
    if out[..trimmed_len].ends_with(',') {
        out.remove(trimmed_len - 1);
    }
}
