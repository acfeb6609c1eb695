//! Variable substitution for tasks
//!
//! Expands the editor-style `${...}` placeholders in a task against an
//! [`ExecutionContext`]. Unknown placeholders are left as they are and missing
//! values expand to an empty string, so substitution never fails.

use crate::runner::{ExecutionContext, Task, TaskKind};
use regex::{Captures, Regex};
use std::path::{Component, Path, MAIN_SEPARATOR};
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{env:([^}]+)\}").expect("env pattern is valid"));

/// Values of the non-environment placeholders for one context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    pub workspace_folder: String,
    pub workspace_folder_basename: String,
    pub file: String,
    pub file_basename: String,
    pub file_basename_no_extension: String,
    pub file_dirname: String,
    pub file_extname: String,
    pub file_workspace_folder: String,
    pub relative_file: String,
    pub relative_file_dirname: String,
    pub cwd: String,
    pub path_separator: String,
}

impl Variables {
    /// Compute every placeholder value from the context
    pub fn from_context(ctx: &ExecutionContext) -> Self {
        let workspace = ctx.workspace_folder.as_path();
        let mut vars = Variables {
            workspace_folder: lossy(workspace),
            workspace_folder_basename: file_name(workspace),
            cwd: lossy(&ctx.cwd),
            path_separator: MAIN_SEPARATOR.to_string(),
            ..Default::default()
        };

        let Some(file) = ctx.file.as_deref() else {
            return vars;
        };

        vars.file = lossy(file);
        vars.file_basename = file_name(file);
        vars.file_basename_no_extension = file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        vars.file_extname = file
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        vars.file_dirname = dirname(file);

        if let Some(relative) = relative_to_workspace(file, workspace) {
            vars.file_workspace_folder = vars.workspace_folder.clone();
            vars.relative_file_dirname = dirname(Path::new(&relative));
            vars.relative_file = relative;
        }

        vars
    }

    fn pairs(&self) -> [(&'static str, &str); 12] {
        [
            ("${workspaceFolder}", &self.workspace_folder),
            ("${workspaceFolderBasename}", &self.workspace_folder_basename),
            ("${file}", &self.file),
            ("${fileBasename}", &self.file_basename),
            ("${fileBasenameNoExtension}", &self.file_basename_no_extension),
            ("${fileDirname}", &self.file_dirname),
            ("${fileExtname}", &self.file_extname),
            ("${fileWorkspaceFolder}", &self.file_workspace_folder),
            ("${relativeFile}", &self.relative_file),
            ("${relativeFileDirname}", &self.relative_file_dirname),
            ("${cwd}", &self.cwd),
            ("${pathSeparator}", &self.path_separator),
        ]
    }
}

/// Expand every placeholder in a string
///
/// Context placeholders are replaced first, `${env:NAME}` last.
pub fn interpolate(s: &str, vars: &Variables, ctx: &ExecutionContext) -> String {
    if !s.contains("${") {
        return s.to_string();
    }

    let mut result = s.to_string();
    for (token, value) in vars.pairs() {
        if result.contains(token) {
            result = result.replace(token, value);
        }
    }

    substitute_env_variables(&result, ctx)
}

/// Replace `${env:NAME}` with the variable from the context, or an empty string
pub fn substitute_env_variables(s: &str, ctx: &ExecutionContext) -> String {
    ENV_VAR_PATTERN
        .replace_all(s, |caps: &Captures| {
            ctx.env_var(&caps[1]).unwrap_or_default().to_string()
        })
        .into_owned()
}

/// Produce a resolved copy of a task
///
/// Applies to the command, each argument, `options.cwd`, each `options.env`
/// value, and the npm `path` / typescript `tsconfig` fields. The input task is
/// left untouched.
pub fn substitute_variables(task: &Task, ctx: &ExecutionContext) -> Task {
    let vars = Variables::from_context(ctx);
    let expand = |s: &str| interpolate(s, &vars, ctx);

    let mut resolved = task.clone();
    resolved.command = expand(&task.command);
    resolved.args = task.args.iter().map(|arg| expand(arg)).collect();

    if let Some(options) = resolved.options.as_mut() {
        options.cwd = options.cwd.as_deref().map(expand);
        for value in options.env.values_mut() {
            *value = expand(value);
        }
    }

    resolved.kind = match &task.kind {
        TaskKind::Npm { script, path } => TaskKind::Npm {
            script: script.clone(),
            path: path.as_deref().map(expand),
        },
        TaskKind::Typescript { tsconfig, option } => TaskKind::Typescript {
            tsconfig: tsconfig.as_deref().map(expand),
            option: option.clone(),
        },
        other => other.clone(),
    };

    resolved
}

fn lossy(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn dirname(path: &Path) -> String {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => lossy(parent),
        Some(_) => ".".to_string(),
        None => lossy(path),
    }
}

/// Path of `file` relative to `workspace`, when the file lies inside it
///
/// Relative paths are taken as already relative to the workspace unless they
/// climb out of it with `..`.
fn relative_to_workspace(file: &Path, workspace: &Path) -> Option<String> {
    if file.is_absolute() {
        return file.strip_prefix(workspace).ok().map(lossy);
    }

    let escapes = file
        .components()
        .next()
        .is_some_and(|c| c == Component::ParentDir);
    if escapes {
        None
    } else {
        Some(lossy(file))
    }
}
