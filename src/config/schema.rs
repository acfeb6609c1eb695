//! Tasks file validation
//!
//! A read-only lint over a tasks file. Unlike the resolver it never stops at
//! the first problem: every issue found is collected into a report.

use crate::config::parse::{strip_jsonc, TASKS_FILE_PATH};
use crate::config::types::{TaskConfig, TasksFile};
use crate::error::ResolveError;
use crate::runner::{DependencyResolver, Task};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Task types this tool can run
pub const SUPPORTED_TYPES: &[&str] = &["shell", "process", "npm", "typescript"];

/// Category of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    FileNotFound,
    ReadError,
    JsonSyntax,
    StructureError,
    DuplicateLabel,
    MissingLabel,
    MissingType,
    MissingCommand,
    MissingScript,
    UnknownType,
    InvalidCwd,
    UnknownDependency,
    CircularDependency,
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_label: Option<String>,
}

impl Issue {
    fn new(kind: IssueKind, message: impl Into<String>, task_label: Option<&str>) -> Self {
        Issue {
            kind,
            message: message.into(),
            task_label: task_label.map(str::to_string),
        }
    }
}

/// Result of validating one tasks file
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub path: PathBuf,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
}

impl ValidationReport {
    fn new(path: &Path) -> Self {
        ValidationReport {
            path: path.to_path_buf(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// A file is valid when it has no errors; warnings are allowed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, kind: IssueKind, message: impl Into<String>, label: Option<&str>) {
        self.errors.push(Issue::new(kind, message, label));
    }

    fn warning(&mut self, kind: IssueKind, message: impl Into<String>, label: Option<&str>) {
        self.warnings.push(Issue::new(kind, message, label));
    }
}

/// Validate a tasks file on disk
pub fn validate_tasks_file(path: &Path) -> ValidationReport {
    let mut report = ValidationReport::new(path);

    if !path.exists() {
        report.error(
            IssueKind::FileNotFound,
            format!("tasks file not found: {}", path.display()),
            None,
        );
        return report;
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            report.error(IssueKind::ReadError, format!("failed to read file: {}", e), None);
            return report;
        }
    };

    let json = strip_jsonc(&contents);
    if let Err(e) = serde_json::from_str::<serde_json::Value>(&json) {
        report.error(IssueKind::JsonSyntax, format!("invalid JSON syntax: {}", e), None);
        return report;
    }

    match serde_json::from_str::<TasksFile>(&json) {
        Ok(file) => validate_tasks(&file.tasks, &mut report),
        Err(e) => report.error(
            IssueKind::StructureError,
            format!("invalid {} structure: {}", TASKS_FILE_PATH, e),
            None,
        ),
    }

    report
}

/// Lint already-parsed task definitions into `report`
pub fn validate_tasks(tasks: &[TaskConfig], report: &mut ValidationReport) {
    let all_labels: HashSet<&str> = tasks.iter().map(|t| t.label.as_str()).collect();
    let mut seen_labels = HashSet::new();

    for task in tasks {
        let label = (!task.label.is_empty()).then_some(task.label.as_str());

        if !seen_labels.insert(task.label.as_str()) {
            report.error(
                IssueKind::DuplicateLabel,
                format!("duplicate task label: {}", task.label),
                label,
            );
        }

        if task.label.is_empty() {
            report.error(
                IssueKind::MissingLabel,
                "task is missing required 'label' field",
                None,
            );
        }

        validate_type(task, label, report);

        if let Some(cwd) = task.options.as_ref().and_then(|o| o.cwd.as_deref()) {
            // relative and placeholder paths only make sense at run time
            let cwd_path = Path::new(cwd);
            if cwd_path.is_absolute() && !cwd.contains("${") && !cwd_path.exists() {
                report.warning(
                    IssueKind::InvalidCwd,
                    format!("working directory does not exist: {}", cwd),
                    label,
                );
            }
        }

        for dep in &task.depends_on {
            if !all_labels.contains(dep.as_str()) {
                report.warning(
                    IssueKind::UnknownDependency,
                    format!("task depends on unknown task: {}", dep),
                    label,
                );
            }
        }
    }

    let runtime_tasks: Vec<Task> = tasks.iter().cloned().map(Task::from_config).collect();
    let resolver = DependencyResolver::new(&runtime_tasks);
    for task in &runtime_tasks {
        if let Err(ResolveError::CircularDependency(on)) =
            resolver.resolve_execution_order(&task.label)
        {
            if on == task.label {
                report.warning(
                    IssueKind::CircularDependency,
                    format!("task is part of a dependency cycle through '{}'", on),
                    Some(&task.label),
                );
            }
        }
    }
}

fn validate_type(task: &TaskConfig, label: Option<&str>, report: &mut ValidationReport) {
    match task.task_type.as_str() {
        "" => report.error(
            IssueKind::MissingType,
            "task is missing required 'type' field",
            label,
        ),
        "shell" | "process" if task.command.is_empty() => report.error(
            IssueKind::MissingCommand,
            "task is missing required 'command' field",
            label,
        ),
        "npm" if task.script.as_deref().unwrap_or_default().is_empty() => report.error(
            IssueKind::MissingScript,
            "npm task is missing required 'script' field",
            label,
        ),
        other if !SUPPORTED_TYPES.contains(&other) => report.warning(
            IssueKind::UnknownType,
            format!(
                "unknown task type '{}', supported types: {}",
                other,
                SUPPORTED_TYPES.join(", ")
            ),
            label,
        ),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("tasks.json");
        fs::write(&path, contents).unwrap();
        path
    }

    fn kinds(issues: &[Issue]) -> Vec<IssueKind> {
        issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn test_valid_file() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"{
                // comments are fine
                "version": "2.0.0",
                "tasks": [
                    { "label": "build", "type": "shell", "command": "go build" },
                    { "label": "test", "type": "shell", "command": "go test", "dependsOn": "build" },
                ]
            }"#,
        );

        let report = validate_tasks_file(&path);
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let report = validate_tasks_file(&dir.path().join("missing.json"));
        assert!(!report.is_valid());
        assert_eq!(kinds(&report.errors), vec![IssueKind::FileNotFound]);
    }

    #[test]
    fn test_json_syntax_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"{ "tasks": [ { "label": "a" "type": "shell" } ] }"#);
        let report = validate_tasks_file(&path);
        assert_eq!(kinds(&report.errors), vec![IssueKind::JsonSyntax]);
    }

    #[test]
    fn test_structure_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, r#"{ "tasks": "not a list" }"#);
        let report = validate_tasks_file(&path);
        assert_eq!(kinds(&report.errors), vec![IssueKind::StructureError]);
    }

    #[test]
    fn test_task_errors_and_warnings() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"{ "tasks": [
                { "label": "build", "type": "shell", "command": "make" },
                { "label": "build", "type": "shell", "command": "make" },
                { "type": "shell", "command": "echo" },
                { "label": "no-type", "command": "echo" },
                { "label": "no-cmd", "type": "process" },
                { "label": "no-script", "type": "npm" },
                { "label": "gulp", "type": "gulp", "command": "gulp" },
                { "label": "cwd", "type": "shell", "command": "ls",
                  "options": { "cwd": "/definitely/not/a/real/dir" } },
                { "label": "deps", "type": "shell", "command": "ls", "dependsOn": ["ghost"] }
            ] }"#,
        );

        let report = validate_tasks_file(&path);
        assert!(!report.is_valid());
        assert_eq!(
            kinds(&report.errors),
            vec![
                IssueKind::DuplicateLabel,
                IssueKind::MissingLabel,
                IssueKind::MissingType,
                IssueKind::MissingCommand,
                IssueKind::MissingScript,
            ]
        );
        assert_eq!(
            kinds(&report.warnings),
            vec![
                IssueKind::UnknownType,
                IssueKind::InvalidCwd,
                IssueKind::UnknownDependency,
            ]
        );
        assert_eq!(report.warnings[2].task_label.as_deref(), Some("deps"));
    }

    #[test]
    fn test_placeholder_cwd_not_checked() {
        let tasks: TasksFile = serde_json::from_str(
            r#"{ "tasks": [ { "label": "a", "type": "shell", "command": "ls",
                "options": { "cwd": "${workspaceFolder}/src" } } ] }"#,
        )
        .unwrap();
        let mut report = ValidationReport::new(Path::new("tasks.json"));
        validate_tasks(&tasks.tasks, &mut report);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_cycle_is_a_warning() {
        let tasks: TasksFile = serde_json::from_str(
            r#"{ "tasks": [
                { "label": "a", "type": "shell", "command": "echo a", "dependsOn": "b" },
                { "label": "b", "type": "shell", "command": "echo b", "dependsOn": "a" }
            ] }"#,
        )
        .unwrap();
        let mut report = ValidationReport::new(Path::new("tasks.json"));
        validate_tasks(&tasks.tasks, &mut report);

        assert!(report.is_valid());
        assert_eq!(
            kinds(&report.warnings),
            vec![IssueKind::CircularDependency, IssueKind::CircularDependency]
        );
    }

    #[test]
    fn test_report_serializes() {
        let mut report = ValidationReport::new(Path::new("tasks.json"));
        report.warning(IssueKind::UnknownType, "unknown", Some("x"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["warnings"][0]["type"], "unknown_type");
        assert_eq!(json["warnings"][0]["task_label"], "x");
    }
}
