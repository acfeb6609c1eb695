//! Task records
//!
//! This module contains the runtime representation of tasks. Records are built
//! once from the deserialized file and never mutated afterwards; variable
//! substitution produces a new record.

use crate::config;
use std::collections::HashMap;
use std::fmt;

/// Runtime task representation
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// Unique task label
    pub label: String,

    /// Invocation strategy
    pub kind: TaskKind,

    /// Command to run (shell/process)
    pub command: String,

    /// Arguments appended to the command line or passed as argv
    pub args: Vec<String>,

    /// Execution options; `None` when the file has no options block
    pub options: Option<TaskOptions>,

    /// Labels this task depends on, in declared order
    pub depends_on: Vec<String>,

    /// How dependencies relate to each other
    pub depends_order: DependsOrder,

    /// Group membership
    pub group: Option<TaskGroup>,

    /// Human readable description
    pub detail: Option<String>,

    /// Problem matcher, kept for display only
    pub problem_matcher: Option<serde_json::Value>,
}

/// Task kind with its kind-specific payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    /// Command line handed to a shell
    Shell,

    /// Executable started directly with `args` as argv
    Process,

    /// `npm run <script>`
    Npm {
        script: String,
        path: Option<String>,
    },

    /// `tsc`
    Typescript {
        tsconfig: Option<String>,
        option: Option<String>,
    },

    /// Any type this tool cannot run
    Unknown(String),
}

impl TaskKind {
    /// Type name as written in tasks.json
    pub fn name(&self) -> &str {
        match self {
            TaskKind::Shell => "shell",
            TaskKind::Process => "process",
            TaskKind::Npm { .. } => "npm",
            TaskKind::Typescript { .. } => "typescript",
            TaskKind::Unknown(name) => name,
        }
    }

    /// Whether the task runs `command` (as opposed to a generated tool invocation)
    pub fn uses_command(&self) -> bool {
        matches!(self, TaskKind::Shell | TaskKind::Process)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Dependency ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DependsOrder {
    /// Dependencies run one after another in declared order
    Sequence,

    /// Dependencies only have to finish before the dependent
    #[default]
    Parallel,
}

impl DependsOrder {
    fn from_config(value: Option<&str>) -> Self {
        match value {
            Some("sequence") => DependsOrder::Sequence,
            _ => DependsOrder::Parallel,
        }
    }
}

impl fmt::Display for DependsOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependsOrder::Sequence => f.write_str("sequence"),
            DependsOrder::Parallel => f.write_str("parallel"),
        }
    }
}

/// Group membership
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskGroup {
    pub kind: String,
    pub is_default: bool,
}

/// Execution options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskOptions {
    /// Working directory override
    pub cwd: Option<String>,

    /// Environment entries layered over the inherited environment
    pub env: HashMap<String, String>,

    /// Shell override
    pub shell: Option<ShellOptions>,
}

/// Shell override
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOptions {
    pub executable: Option<String>,
    pub args: Vec<String>,
}

impl Task {
    /// Create a task from its configuration
    pub fn from_config(config: config::TaskConfig) -> Self {
        let kind = match config.task_type.as_str() {
            "shell" => TaskKind::Shell,
            "process" => TaskKind::Process,
            "npm" => TaskKind::Npm {
                script: config.script.unwrap_or_default(),
                path: non_empty(config.path),
            },
            "typescript" => TaskKind::Typescript {
                tsconfig: non_empty(config.tsconfig),
                option: non_empty(config.option),
            },
            other => TaskKind::Unknown(other.to_string()),
        };

        Task {
            label: config.label,
            kind,
            command: config.command,
            args: config.args,
            options: config.options.map(TaskOptions::from_config),
            depends_on: config.depends_on,
            depends_order: DependsOrder::from_config(config.depends_order.as_deref()),
            group: config.group.map(|g| TaskGroup {
                kind: g.kind,
                is_default: g.is_default,
            }),
            detail: config.detail,
            problem_matcher: config.problem_matcher,
        }
    }

    /// Create a shell task with no options
    pub fn shell(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self::new(label, TaskKind::Shell, command)
    }

    /// Create a process task with no options
    pub fn process(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self::new(label, TaskKind::Process, command)
    }

    fn new(label: impl Into<String>, kind: TaskKind, command: impl Into<String>) -> Self {
        Task {
            label: label.into(),
            kind,
            command: command.into(),
            args: Vec::new(),
            options: None,
            depends_on: Vec::new(),
            depends_order: DependsOrder::Parallel,
            group: None,
            detail: None,
            problem_matcher: None,
        }
    }

    /// Set the arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the dependencies and their order
    pub fn with_depends_on<I, S>(mut self, deps: I, order: DependsOrder) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self.depends_order = order;
        self
    }

    /// Set the options block
    pub fn with_options(mut self, options: TaskOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Group kind, or an empty string
    pub fn group_kind(&self) -> &str {
        self.group.as_ref().map(|g| g.kind.as_str()).unwrap_or("")
    }

    /// Command followed by its arguments, space separated
    pub fn command_line(&self) -> String {
        join_command_line(&self.command, &self.args)
    }
}

impl TaskOptions {
    fn from_config(config: config::OptionsConfig) -> Self {
        TaskOptions {
            cwd: non_empty(config.cwd),
            env: config.env,
            shell: config.shell.map(|s| ShellOptions {
                executable: non_empty(s.executable),
                args: s.args,
            }),
        }
    }
}

/// `command` plus a single space and the space-joined args, only when there are args
pub fn join_command_line(command: &str, args: &[String]) -> String {
    if args.is_empty() {
        command.to_string()
    } else {
        format!("{} {}", command, args.join(" "))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
