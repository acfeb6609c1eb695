//! Integration tests for task execution

#![cfg(unix)]

mod common;

use common::create_workspace;
use std::fs;
use std::path::Path;
use taskjson::config::load_tasks;
use taskjson::error::{ExecutionError, ResolveError};
use taskjson::runner::{run_task, run_task_with_dependencies, ExecutionContext, Task, Verbosity};

fn quiet_context(workspace: &Path) -> ExecutionContext {
    ExecutionContext::new(workspace)
        .with_cwd(workspace)
        .with_verbosity(Verbosity::Quiet)
}

fn read_log(workspace: &Path) -> Vec<String> {
    fs::read_to_string(workspace.join("order.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_execute_simple_task() {
    let (dir, _) = create_workspace(r#"{ "tasks": [] }"#);
    let ctx = quiet_context(dir.path());
    assert!(run_task(&Task::shell("hello", "echo 'Hello, World!'"), &ctx).is_ok());
}

#[test]
fn test_execute_task_with_failing_command() {
    let (dir, _) = create_workspace(r#"{ "tasks": [] }"#);
    let ctx = quiet_context(dir.path());

    let err = run_task(&Task::shell("fail", "exit 3"), &ctx).unwrap_err();
    assert!(matches!(err, ExecutionError::NonZeroExit(Some(3))));
}

#[test]
fn test_missing_program_is_launch_failure() {
    let (dir, _) = create_workspace(r#"{ "tasks": [] }"#);
    let ctx = quiet_context(dir.path());

    let err = run_task(&Task::process("ghost", "definitely-not-a-real-program"), &ctx)
        .unwrap_err();
    assert!(matches!(err, ExecutionError::ProcessLaunchFailed { .. }));
}

#[test]
fn test_dependencies_run_in_order() {
    let (dir, tasks_path) = create_workspace(
        r#"{ "tasks": [
            { "label": "clean", "type": "shell", "command": "echo clean >> order.log" },
            { "label": "compile", "type": "shell", "command": "echo compile >> order.log",
              "dependsOn": "clean" },
            { "label": "lint", "type": "shell", "command": "echo lint >> order.log" },
            { "label": "build", "type": "shell", "command": "echo build >> order.log",
              "dependsOn": ["compile", "lint"], "dependsOrder": "sequence" }
        ] }"#,
    );
    let tasks = load_tasks(&tasks_path).unwrap();
    let ctx = quiet_context(dir.path());

    run_task_with_dependencies("build", &tasks, &ctx).unwrap();

    assert_eq!(read_log(dir.path()), vec!["clean", "compile", "lint", "build"]);
}

#[test]
fn test_chain_stops_at_first_failure() {
    let (dir, tasks_path) = create_workspace(
        r#"{ "tasks": [
            { "label": "first", "type": "shell", "command": "echo first >> order.log" },
            { "label": "broken", "type": "shell", "command": "exit 1", "dependsOn": "first" },
            { "label": "last", "type": "shell", "command": "echo last >> order.log",
              "dependsOn": "broken" }
        ] }"#,
    );
    let tasks = load_tasks(&tasks_path).unwrap();
    let ctx = quiet_context(dir.path());

    let err = run_task_with_dependencies("last", &tasks, &ctx).unwrap_err();
    match err {
        ExecutionError::TaskExecutionFailed { label, .. } => assert_eq!(label, "broken"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(read_log(dir.path()), vec!["first"]);
}

#[test]
fn test_cycle_runs_nothing() {
    let (dir, tasks_path) = create_workspace(
        r#"{ "tasks": [
            { "label": "a", "type": "shell", "command": "echo a >> order.log", "dependsOn": "b" },
            { "label": "b", "type": "shell", "command": "echo b >> order.log", "dependsOn": "a" }
        ] }"#,
    );
    let tasks = load_tasks(&tasks_path).unwrap();
    let ctx = quiet_context(dir.path());

    let err = run_task_with_dependencies("a", &tasks, &ctx).unwrap_err();
    assert!(matches!(
        err,
        ExecutionError::DependencyResolutionFailed(ResolveError::CircularDependency(_))
    ));
    assert!(read_log(dir.path()).is_empty());
}

#[test]
fn test_variables_cwd_and_env_reach_the_child() {
    let (dir, tasks_path) = create_workspace(
        r#"{ "tasks": [
            { "label": "report", "type": "shell",
              "command": "echo \"$GREETING ${env:TASKJSON_TEST_USER} ${fileBasename}\" > out.txt",
              "options": {
                  "cwd": "${workspaceFolder}/build",
                  "env": { "GREETING": "hello" }
              } }
        ] }"#,
    );
    fs::create_dir(dir.path().join("build")).unwrap();
    let tasks = load_tasks(&tasks_path).unwrap();

    let mut ctx = quiet_context(dir.path()).with_file(dir.path().join("src").join("main.rs"));
    ctx.set_env_var("TASKJSON_TEST_USER", "tester");

    run_task(&tasks[0], &ctx).unwrap();

    let out = fs::read_to_string(dir.path().join("build").join("out.txt")).unwrap();
    assert_eq!(out.trim(), "hello tester main.rs");
}

#[test]
fn test_env_file_values_are_visible() {
    let (dir, _) = create_workspace(r#"{ "tasks": [] }"#);
    let env_file = dir.path().join(".env");
    fs::write(&env_file, "FROM_ENV_FILE=loaded\n").unwrap();

    let mut ctx = quiet_context(dir.path());
    ctx.load_env_file(&env_file).unwrap();

    let task = Task::shell("env", "echo $FROM_ENV_FILE > env.txt");
    run_task(&task, &ctx).unwrap();

    let out = fs::read_to_string(dir.path().join("env.txt")).unwrap();
    assert_eq!(out.trim(), "loaded");
}
