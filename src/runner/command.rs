//! Command construction and process launching
//!
//! Turns a resolved task into a [`CommandSpec`] and runs it through a
//! [`ProcessLauncher`].

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{join_command_line, ExecutionContext, Task, TaskKind};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};
use tracing::debug;

#[cfg(windows)]
const DEFAULT_SHELL: &str = "cmd";
#[cfg(windows)]
const DEFAULT_SHELL_ARGS: &[&str] = &["/C"];

#[cfg(not(windows))]
const DEFAULT_SHELL: &str = "/bin/sh";
#[cfg(not(windows))]
const DEFAULT_SHELL_ARGS: &[&str] = &["-c"];

/// A fully specified child process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable to start
    pub program: String,

    /// Arguments, not including the program
    pub args: Vec<String>,

    /// Working directory
    pub working_dir: PathBuf,

    /// Complete environment for the child
    pub env: HashMap<String, String>,
}

impl CommandSpec {
    /// Program and arguments joined for display
    pub fn display_line(&self) -> String {
        join_command_line(&self.program, &self.args)
    }
}

/// Starts a child process and waits for it
pub trait ProcessLauncher {
    /// Run the command to completion with inherited stdio
    fn launch(&mut self, spec: &CommandSpec) -> ExecutionResult<()>;
}

/// Launcher backed by `std::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&mut self, spec: &CommandSpec) -> ExecutionResult<()> {
        debug!(program = %spec.program, args = ?spec.args, dir = %spec.working_dir.display(), "launching");

        let mut command = StdCommand::new(&spec.program);
        command.args(&spec.args);
        command.current_dir(&spec.working_dir);
        command.env_clear();
        command.envs(&spec.env);

        command.stdin(Stdio::inherit());
        command.stdout(Stdio::inherit());
        command.stderr(Stdio::inherit());

        let status = command
            .status()
            .map_err(|source| ExecutionError::ProcessLaunchFailed {
                program: spec.program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(ExecutionError::NonZeroExit(status.code()));
        }

        Ok(())
    }
}

/// Build the invocation for a resolved task
pub fn build_command(task: &Task, ctx: &ExecutionContext) -> ExecutionResult<CommandSpec> {
    let (program, args, working_dir) = match &task.kind {
        TaskKind::Shell => {
            let (program, args) = build_shell_command(task)?;
            (program, args, ctx.cwd.clone())
        }
        TaskKind::Process => {
            let (program, args) = build_process_command(task)?;
            (program, args, ctx.cwd.clone())
        }
        TaskKind::Npm { script, path } => {
            build_npm_command(script, path.as_deref(), &ctx.workspace_folder)?
        }
        TaskKind::Typescript { tsconfig, option } => build_typescript_command(
            tsconfig.as_deref(),
            option.as_deref(),
            &ctx.workspace_folder,
        ),
        TaskKind::Unknown(kind) => {
            return Err(ExecutionError::UnsupportedTaskType(kind.clone()));
        }
    };

    Ok(CommandSpec {
        program,
        args,
        working_dir,
        env: build_env(task, ctx),
    })
}

fn build_shell_command(task: &Task) -> ExecutionResult<(String, Vec<String>)> {
    if task.command.is_empty() {
        return Err(ExecutionError::InvalidTask(
            "task command is empty".to_string(),
        ));
    }

    let shell = task.options.as_ref().and_then(|o| o.shell.as_ref());

    let program = shell
        .and_then(|s| s.executable.clone())
        .unwrap_or_else(|| DEFAULT_SHELL.to_string());

    let mut args: Vec<String> = match shell {
        Some(s) if !s.args.is_empty() => s.args.clone(),
        _ => DEFAULT_SHELL_ARGS.iter().map(|a| a.to_string()).collect(),
    };

    args.push(task.command_line());
    Ok((program, args))
}

fn build_process_command(task: &Task) -> ExecutionResult<(String, Vec<String>)> {
    if task.command.is_empty() {
        return Err(ExecutionError::InvalidTask(
            "task command is empty".to_string(),
        ));
    }

    Ok((task.command.clone(), task.args.clone()))
}

fn build_npm_command(
    script: &str,
    path: Option<&str>,
    workspace: &Path,
) -> ExecutionResult<(String, Vec<String>, PathBuf)> {
    if script.is_empty() {
        return Err(ExecutionError::InvalidTask(
            "npm task requires a script".to_string(),
        ));
    }

    // Path::join keeps absolute paths as they are
    let working_dir = match path {
        Some(path) if !path.is_empty() => workspace.join(path),
        _ => workspace.to_path_buf(),
    };

    Ok((
        "npm".to_string(),
        vec!["run".to_string(), script.to_string()],
        working_dir,
    ))
}

fn build_typescript_command(
    tsconfig: Option<&str>,
    option: Option<&str>,
    workspace: &Path,
) -> (String, Vec<String>, PathBuf) {
    let mut args = Vec::new();

    // substitution can leave an empty value behind
    if let Some(tsconfig) = tsconfig.filter(|t| !t.is_empty()) {
        args.push("-p".to_string());
        args.push(tsconfig.to_string());
    }

    match option {
        Some("watch") => args.push("--watch".to_string()),
        Some(option) if !option.is_empty() => args.push(option.to_string()),
        _ => {}
    }

    ("tsc".to_string(), args, workspace.to_path_buf())
}

/// Inherited environment with the task's entries layered on top
fn build_env(task: &Task, ctx: &ExecutionContext) -> HashMap<String, String> {
    let mut env = ctx.env.clone();
    if let Some(options) = &task.options {
        env.extend(options.env.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    env
}
