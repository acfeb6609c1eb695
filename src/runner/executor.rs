//! Task execution
//!
//! Runs a single task, or a task and everything it depends on, one process at
//! a time. The first failure stops the chain.

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{
    build_command, substitute_variables, CommandSpec, DependencyResolver, ExecutionContext,
    ProcessLauncher, SystemLauncher, Task,
};
use std::path::PathBuf;
use tracing::{debug, info};

/// Resolve, build and launch one task
pub fn run_task(task: &Task, ctx: &ExecutionContext) -> ExecutionResult<()> {
    run_task_with(task, ctx, &mut SystemLauncher)
}

/// Run `label` after all of its transitive dependencies
pub fn run_task_with_dependencies(
    label: &str,
    tasks: &[Task],
    ctx: &ExecutionContext,
) -> ExecutionResult<()> {
    run_task_with_dependencies_with(label, tasks, ctx, &mut SystemLauncher)
}

/// [`run_task`] with a caller-supplied launcher
pub fn run_task_with(
    task: &Task,
    ctx: &ExecutionContext,
    launcher: &mut dyn ProcessLauncher,
) -> ExecutionResult<()> {
    let spec = prepare_command(task, ctx)?;

    ctx.print_task_start(&task.label);
    ctx.print_debug(&format!("Running: {}", spec.display_line()));

    launcher.launch(&spec)?;

    ctx.print_task_complete(&task.label);
    Ok(())
}

/// [`run_task_with_dependencies`] with a caller-supplied launcher
pub fn run_task_with_dependencies_with(
    label: &str,
    tasks: &[Task],
    ctx: &ExecutionContext,
    launcher: &mut dyn ProcessLauncher,
) -> ExecutionResult<()> {
    let resolver = DependencyResolver::new(tasks);
    let order = resolver.resolve_execution_order(label)?;

    info!(target_label = label, count = order.len(), "running task chain");

    for task in order {
        run_task_with(task, ctx, launcher).map_err(|source| {
            debug!(label = %task.label, "task failed, stopping chain");
            ExecutionError::TaskExecutionFailed {
                label: task.label.clone(),
                source: Box::new(source),
            }
        })?;
    }

    Ok(())
}

/// Substitute variables and build the final invocation, without launching
///
/// `options.cwd` overrides the working directory of shell and process tasks.
pub fn prepare_command(task: &Task, ctx: &ExecutionContext) -> ExecutionResult<CommandSpec> {
    let resolved = substitute_variables(task, ctx);
    let mut spec = build_command(&resolved, ctx)?;

    if resolved.kind.uses_command() {
        if let Some(cwd) = resolved.options.as_ref().and_then(|o| o.cwd.as_deref()) {
            spec.working_dir = PathBuf::from(cwd);
        }
    }

    debug!(label = %task.label, program = %spec.program, "prepared command");
    Ok(spec)
}
