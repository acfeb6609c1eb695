//! Common test utilities

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a temporary workspace with a .vscode/tasks.json file
pub fn create_workspace(tasks_json: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let vscode_dir = temp_dir.path().join(".vscode");
    fs::create_dir(&vscode_dir).unwrap();

    let tasks_path = vscode_dir.join("tasks.json");
    fs::write(&tasks_path, tasks_json).unwrap();
    (temp_dir, tasks_path)
}

/// Create a workspace plus a nested directory to start searches from
pub fn create_workspace_with_subdir(tasks_json: &str) -> (TempDir, PathBuf, PathBuf) {
    let (temp_dir, tasks_path) = create_workspace(tasks_json);
    let sub_dir = temp_dir.path().join("src").join("nested");
    fs::create_dir_all(&sub_dir).unwrap();
    (temp_dir, tasks_path, sub_dir)
}

/// A tasks file exercising every dependency shape
pub const SAMPLE_TASKS: &str = r#"{
    // sample workspace
    "version": "2.0.0",
    "tasks": [
        {
            "label": "clean",
            "type": "shell",
            "command": "echo",
            "args": ["cleaning"],
        },
        {
            "label": "compile",
            "type": "shell",
            "command": "echo compiling ${workspaceFolderBasename}",
            "group": { "kind": "build", "isDefault": true },
            "dependsOn": "clean"
        },
        {
            "label": "lint",
            "type": "process",
            "command": "echo",
            "args": ["linting"]
        },
        {
            "label": "test",
            "type": "shell",
            "command": "echo testing",
            "group": "test",
            "dependsOn": ["compile", "lint"],
            "dependsOrder": "sequence"
        },
        {
            "label": "web",
            "type": "npm",
            "script": "build",
            "path": "frontend"
        }
    ]
}"#;
