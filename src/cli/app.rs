//! Main CLI application

use crate::config::{
    find_tasks_file, load_tasks, resolve_workspace_folder, validate_tasks_file, write_template,
    ValidationReport, TASKS_FILE_PATH, TEMPLATE_NAMES,
};
use crate::error::{ConfigError, ExecutionError};
use crate::logging::{init_logging, LogLevel};
use crate::runner::{
    prepare_command, run_task, run_task_with_dependencies, DependencyResolver, ExecutionContext,
    Task, TaskKind, Verbosity,
};
use crate::watch::{watch_paths, WatchFilter, DEFAULT_EXCLUDES};
use anyhow::{bail, Context as _, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use colored::Colorize;
use std::collections::BTreeMap;
use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Longest command shown by `list` before truncation
const LIST_COMMAND_WIDTH: usize = 30;

/// Options shared by every subcommand
#[derive(Debug, Clone)]
struct GlobalOptions {
    config: Option<PathBuf>,
    verbosity: Verbosity,
}

impl GlobalOptions {
    fn from_matches(matches: &ArgMatches) -> Self {
        GlobalOptions {
            config: matches.get_one::<PathBuf>("config").cloned(),
            verbosity: get_verbosity(matches),
        }
    }

    /// Locate and load the tasks file
    fn load(&self) -> Result<(PathBuf, Vec<Task>)> {
        let path = find_tasks_file(self.config.as_deref()).context("failed to find tasks file")?;
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{} Loading tasks from: {}", "[DEBUG]".dimmed(), path.display());
        }
        let tasks = load_tasks(&path).context("failed to load tasks")?;
        Ok((path, tasks))
    }
}

/// Build the clap command tree
pub fn build_cli() -> Command {
    Command::new("taskjson")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run VS Code tasks.json tasks from the command line")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Path to tasks.json (default: search for .vscode/tasks.json upwards)")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet")
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Diagnostic log level (overrides TASKJSON_LOG)")
                .value_parser(value_parser!(LogLevel))
                .global(true),
        )
        .subcommand(
            Command::new("run")
                .about("Run a task and its dependencies")
                .arg(label_arg())
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Show what would be executed without running it")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("no-deps")
                        .long("no-deps")
                        .help("Run only the named task, skipping its dependencies")
                        .action(ArgAction::SetTrue),
                )
                .args(context_args()),
        )
        .subcommand(
            Command::new("list")
                .about("List available tasks")
                .arg(
                    Arg::new("group")
                        .long("group")
                        .value_name("GROUP")
                        .help("Filter by group (build, test)"),
                )
                .arg(
                    Arg::new("type")
                        .long("type")
                        .value_name("TYPE")
                        .help("Filter by type (shell, process, npm, typescript)"),
                ),
        )
        .subcommand(
            Command::new("info")
                .about("Show task details")
                .arg(label_arg()),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a tasks.json file for problems")
                .arg(
                    Arg::new("path")
                        .value_name("PATH")
                        .help("File to validate (default: the discovered tasks file)")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("watch")
                .about("Watch files and re-run a task on change")
                .arg(label_arg())
                .args(context_args())
                .arg(
                    Arg::new("path")
                        .long("path")
                        .value_name("PATH")
                        .help("Paths to watch (default: workspace folder)")
                        .value_parser(value_parser!(PathBuf))
                        .value_delimiter(',')
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("ext")
                        .long("ext")
                        .value_name("EXT")
                        .help("File extensions to watch (e.g. .go,.js)")
                        .value_delimiter(',')
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("exclude")
                        .long("exclude")
                        .value_name("PATTERN")
                        .help("Path substrings to ignore")
                        .value_delimiter(',')
                        .action(ArgAction::Append)
                        .default_values(DEFAULT_EXCLUDES.iter().copied()),
                )
                .arg(
                    Arg::new("glob")
                        .long("glob")
                        .value_name("GLOB")
                        .help("Only react to paths matching these globs")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("delay")
                        .long("delay")
                        .value_name("DURATION")
                        .help("Quiet period before running (e.g. 500ms, 2s)")
                        .value_parser(parse_delay)
                        .default_value("500ms"),
                ),
        )
        .subcommand(
            Command::new("init")
                .about("Create a starter tasks.json")
                .arg(
                    Arg::new("template")
                        .short('t')
                        .long("template")
                        .value_name("NAME")
                        .help("Template to use")
                        .value_parser(TEMPLATE_NAMES.to_vec())
                        .default_value("default"),
                )
                .arg(
                    Arg::new("force")
                        .short('f')
                        .long("force")
                        .help("Overwrite an existing file")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("PATH")
                        .help("Output path (default: .vscode/tasks.json)")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .value_name("SHELL")
                        .required(true)
                        .value_parser(value_parser!(Shell)),
                ),
        )
}

fn label_arg() -> Arg {
    Arg::new("label")
        .value_name("TASK")
        .help("Task label")
        .required(true)
}

/// Arguments that shape the execution context
fn context_args() -> Vec<Arg> {
    vec![
        Arg::new("workspace-folder")
            .long("workspace-folder")
            .value_name("DIR")
            .help("Workspace folder (default: git root, else current directory)")
            .value_parser(value_parser!(PathBuf)),
        Arg::new("file")
            .long("file")
            .value_name("FILE")
            .help("File used for ${file} and related variables")
            .value_parser(value_parser!(PathBuf)),
        Arg::new("env-file")
            .long("env-file")
            .value_name("FILE")
            .help("Load extra environment variables from a dotenv file")
            .value_parser(value_parser!(PathBuf)),
    ]
}

/// Accept humantime durations, or a bare number of milliseconds
fn parse_delay(value: &str) -> std::result::Result<Duration, String> {
    let value = value.trim();
    if let Ok(millis) = value.parse::<u64>() {
        return Ok(Duration::from_millis(millis));
    }
    humantime::parse_duration(value).map_err(|e| e.to_string())
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Build the execution context from `--workspace-folder`, `--file` and `--env-file`
fn build_context(globals: &GlobalOptions, matches: &ArgMatches) -> Result<ExecutionContext> {
    let cwd = env::current_dir().context("failed to get current directory")?;
    let explicit = matches.get_one::<PathBuf>("workspace-folder");
    let workspace = resolve_workspace_folder(explicit.map(PathBuf::as_path), &cwd);

    let mut ctx = ExecutionContext::new(workspace)
        .with_cwd(cwd)
        .with_optional_file(matches.get_one::<PathBuf>("file").cloned())
        .with_verbosity(globals.verbosity);

    if let Some(env_file) = matches.get_one::<PathBuf>("env-file") {
        ctx.load_env_file(env_file)
            .with_context(|| format!("failed to load env file {}", env_file.display()))?;
    }

    ctx.print_debug(&format!("Workspace folder: {}", ctx.workspace_folder.display()));
    Ok(ctx)
}

/// Last declaration wins, matching the resolver
fn find_task<'a>(tasks: &'a [Task], label: &str) -> Result<&'a Task> {
    tasks
        .iter()
        .rev()
        .find(|t| t.label == label)
        .ok_or_else(|| ConfigError::TaskNotFound(label.to_string()).into())
}

fn required_label(matches: &ArgMatches) -> Result<&str> {
    matches
        .get_one::<String>("label")
        .map(String::as_str)
        .context("missing task label")
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<()> {
    run_from(env::args_os())
}

/// Run the CLI application with explicit arguments
pub fn run_from<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let matches = build_cli().try_get_matches_from(args).unwrap_or_else(|e| e.exit());

    init_logging(matches.get_one::<LogLevel>("log-level").copied());
    let globals = GlobalOptions::from_matches(&matches);
    debug!(?globals, "parsed global options");

    match matches.subcommand() {
        Some(("run", m)) => cmd_run(&globals, m),
        Some(("list", m)) => cmd_list(&globals, m),
        Some(("info", m)) => cmd_info(&globals, m),
        Some(("validate", m)) => cmd_validate(&globals, m),
        Some(("watch", m)) => cmd_watch(&globals, m),
        Some(("init", m)) => cmd_init(&globals, m),
        Some(("completions", m)) => cmd_completions(m),
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}

fn cmd_run(globals: &GlobalOptions, matches: &ArgMatches) -> Result<()> {
    let label = required_label(matches)?;
    let (_, tasks) = globals.load()?;
    let task = find_task(&tasks, label)?;
    let ctx = build_context(globals, matches)?;
    let no_deps = matches.get_flag("no-deps");

    if matches.get_flag("dry-run") {
        let plan = if no_deps {
            vec![task]
        } else {
            DependencyResolver::new(&tasks).resolve_execution_order(label)?
        };
        return print_plan(&mut io::stdout().lock(), &plan, &ctx);
    }

    if no_deps {
        run_task(task, &ctx).map_err(|source| ExecutionError::TaskExecutionFailed {
            label: task.label.clone(),
            source: Box::new(source),
        })?;
    } else {
        run_task_with_dependencies(label, &tasks, &ctx)?;
    }
    Ok(())
}

/// Print each task's resolved invocation without running anything
fn print_plan(out: &mut impl Write, plan: &[&Task], ctx: &ExecutionContext) -> Result<()> {
    writeln!(out, "Execution plan ({} task(s)):", plan.len())?;
    for (index, task) in plan.iter().enumerate() {
        let spec = prepare_command(task, ctx)
            .with_context(|| format!("cannot build command for task '{}'", task.label))?;
        writeln!(out, "{}. {} [{}]", index + 1, task.label, task.kind)?;
        writeln!(out, "   command: {}", spec.display_line())?;
        writeln!(out, "   cwd:     {}", spec.working_dir.display())?;
    }
    Ok(())
}

fn cmd_list(globals: &GlobalOptions, matches: &ArgMatches) -> Result<()> {
    let (_, tasks) = globals.load()?;
    let group = matches.get_one::<String>("group").map(String::as_str);
    let kind = matches.get_one::<String>("type").map(String::as_str);
    let filtered = filter_tasks(&tasks, group, kind);

    let mut out = io::stdout().lock();
    if filtered.is_empty() {
        if globals.verbosity > Verbosity::Quiet {
            writeln!(out, "No tasks found")?;
        }
        return Ok(());
    }

    if globals.verbosity == Verbosity::Quiet {
        for task in &filtered {
            writeln!(out, "{}", task.label)?;
        }
        return Ok(());
    }

    writeln!(out, "{:<20} {:<10} {:<8} COMMAND", "LABEL", "TYPE", "GROUP")?;
    writeln!(out, "{}", "-".repeat(60))?;
    for task in &filtered {
        writeln!(out, "{}", format_task_row(task))?;
    }
    Ok(())
}

fn filter_tasks<'a>(tasks: &'a [Task], group: Option<&str>, kind: Option<&str>) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| group.map_or(true, |g| t.group_kind() == g))
        .filter(|t| kind.map_or(true, |k| t.kind.name() == k))
        .collect()
}

fn format_task_row(task: &Task) -> String {
    let group = match task.group_kind() {
        "" => "-",
        kind => kind,
    };
    format!(
        "{:<20} {:<10} {:<8} {}",
        task.label,
        task.kind.name(),
        group,
        truncate(&task.command_line(), LIST_COMMAND_WIDTH)
    )
}

/// Shorten to `width` characters, ending in `...` when cut
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn cmd_info(globals: &GlobalOptions, matches: &ArgMatches) -> Result<()> {
    let label = required_label(matches)?;
    let (tasks_path, tasks) = globals.load()?;
    let task = find_task(&tasks, label)?;

    let mut out = io::stdout().lock();
    if globals.verbosity == Verbosity::Quiet {
        writeln!(out, "{}", info_quiet_line(task))?;
    } else {
        write_task_info(&mut out, task, &tasks, &tasks_path, globals.verbosity)?;
    }
    Ok(())
}

fn info_quiet_line(task: &Task) -> String {
    format!("{}\t{}\t{}", task.label, task.kind, task.command_line())
}

fn write_task_info(
    out: &mut impl Write,
    task: &Task,
    tasks: &[Task],
    tasks_path: &Path,
    verbosity: Verbosity,
) -> io::Result<()> {
    writeln!(out, "Task: {}", task.label)?;
    writeln!(out, "{}", "=".repeat(task.label.chars().count() + 6))?;
    writeln!(out)?;

    writeln!(out, "Type:     {}", task.kind)?;
    if !task.command.is_empty() {
        writeln!(out, "Command:  {}", task.command)?;
    }
    if !task.args.is_empty() {
        writeln!(out, "Args:     {}", task.args.join(" "))?;
    }
    match &task.kind {
        TaskKind::Npm { script, path } => {
            writeln!(out, "Script:   {}", script)?;
            if let Some(path) = path {
                writeln!(out, "Path:     {}", path)?;
            }
        }
        TaskKind::Typescript { tsconfig, option } => {
            if let Some(tsconfig) = tsconfig {
                writeln!(out, "Tsconfig: {}", tsconfig)?;
            }
            if let Some(option) = option {
                writeln!(out, "Option:   {}", option)?;
            }
        }
        _ => {}
    }
    if let Some(group) = &task.group {
        let default = if group.is_default { " (default)" } else { "" };
        writeln!(out, "Group:    {}{}", group.kind, default)?;
    }
    if let Some(detail) = &task.detail {
        writeln!(out, "Detail:   {}", detail)?;
    }

    if let Some(options) = &task.options {
        writeln!(out)?;
        writeln!(out, "Options:")?;
        if let Some(cwd) = &options.cwd {
            writeln!(out, "  Working Directory: {}", cwd)?;
        }
        if !options.env.is_empty() {
            writeln!(out, "  Environment Variables:")?;
            let sorted: BTreeMap<_, _> = options.env.iter().collect();
            for (key, value) in sorted {
                writeln!(out, "    {}={}", key, value)?;
            }
        }
        if let Some(shell) = &options.shell {
            writeln!(out, "  Shell Options:")?;
            if let Some(executable) = &shell.executable {
                writeln!(out, "    Executable: {}", executable)?;
            }
            if !shell.args.is_empty() {
                writeln!(out, "    Args: {}", shell.args.join(" "))?;
            }
        }
    }

    if !task.depends_on.is_empty() {
        writeln!(out)?;
        writeln!(out, "Depends On:    {}", task.depends_on.join(", "))?;
        writeln!(out, "Depends Order: {}", task.depends_order)?;

        match DependencyResolver::new(tasks).parallel_groups(&task.label) {
            Ok(groups) => {
                writeln!(out, "Parallel Groups:")?;
                for (index, group) in groups.iter().enumerate() {
                    let labels: Vec<&str> = group.iter().map(|t| t.label.as_str()).collect();
                    writeln!(out, "  {}. {}", index + 1, labels.join(", "))?;
                }
            }
            Err(e) => writeln!(out, "Parallel Groups: unavailable ({})", e)?,
        }
    }

    if let Some(matcher) = &task.problem_matcher {
        writeln!(out)?;
        writeln!(out, "Problem Matcher: {}", matcher)?;
    }

    if verbosity >= Verbosity::Verbose {
        writeln!(out)?;
        writeln!(out, "Additional Information:")?;
        writeln!(out, "  Source File: {}", tasks_path.display())?;
    }
    Ok(())
}

fn cmd_validate(globals: &GlobalOptions, matches: &ArgMatches) -> Result<()> {
    let path = match matches.get_one::<PathBuf>("path") {
        Some(path) => path.clone(),
        None => find_tasks_file(globals.config.as_deref()).context("failed to find tasks file")?,
    };

    let report = validate_tasks_file(&path);
    print_report(&mut io::stdout().lock(), &report, globals.verbosity)?;

    if !report.is_valid() {
        bail!("validation failed with {} error(s)", report.errors.len());
    }
    Ok(())
}

fn print_report(
    out: &mut impl Write,
    report: &ValidationReport,
    verbosity: Verbosity,
) -> Result<()> {
    let quiet = verbosity == Verbosity::Quiet;

    for issue in &report.errors {
        let label = issue
            .task_label
            .as_deref()
            .map(|l| format!(" [{}]", l))
            .unwrap_or_default();
        writeln!(out, "{}{} {}", "error".red().bold(), label, issue.message)?;
    }
    if !quiet {
        for issue in &report.warnings {
            let label = issue
                .task_label
                .as_deref()
                .map(|l| format!(" [{}]", l))
                .unwrap_or_default();
            writeln!(out, "{}{} {}", "warning".yellow(), label, issue.message)?;
        }
    }

    if report.is_valid() && !quiet {
        writeln!(
            out,
            "{} {} is valid ({} warning(s))",
            "ok".green().bold(),
            report.path.display(),
            report.warnings.len()
        )?;
    }
    Ok(())
}

fn cmd_watch(globals: &GlobalOptions, matches: &ArgMatches) -> Result<()> {
    let label = required_label(matches)?;
    let (_, tasks) = globals.load()?;
    find_task(&tasks, label)?;
    let ctx = build_context(globals, matches)?;

    let strings = |id: &str| -> Vec<String> {
        matches
            .get_many::<String>(id)
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    };

    let paths: Vec<PathBuf> = match matches.get_many::<PathBuf>("path") {
        Some(values) => values
            .map(|p| {
                if p.is_absolute() {
                    p.clone()
                } else {
                    ctx.workspace_folder.join(p)
                }
            })
            .collect(),
        None => vec![ctx.workspace_folder.clone()],
    };

    let filter = WatchFilter::new(
        &ctx.workspace_folder,
        &strings("ext"),
        &strings("exclude"),
        &strings("glob"),
    )?;
    let delay = matches
        .get_one::<Duration>("delay")
        .copied()
        .unwrap_or(crate::watch::DEFAULT_DELAY);

    for path in &paths {
        ctx.print_debug(&format!("Watching: {}", path.display()));
    }
    ctx.print_info(&format!("Watching for changes... (task: {})", label));
    ctx.print_info("Press Ctrl+C to stop");

    watch_paths(&paths, &filter, delay, || {
        if let Err(e) = run_task_with_dependencies(label, &tasks, &ctx) {
            debug!(label, "watched task failed");
            ctx.print_error(&format!("{:#}", anyhow::Error::new(e)));
        }
    })
}

fn cmd_init(globals: &GlobalOptions, matches: &ArgMatches) -> Result<()> {
    let template = matches
        .get_one::<String>("template")
        .map(String::as_str)
        .unwrap_or("default");
    let output = matches
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(TASKS_FILE_PATH));

    write_template(template, &output, matches.get_flag("force"))?;

    if globals.verbosity > Verbosity::Quiet {
        println!(
            "Successfully created {} using '{}' template",
            output.display(),
            template
        );
    }
    Ok(())
}

fn cmd_completions(matches: &ArgMatches) -> Result<()> {
    let shell = matches
        .get_one::<Shell>("shell")
        .copied()
        .context("missing shell")?;
    let mut cli = build_cli();
    clap_complete::generate(shell, &mut cli, "taskjson", &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::DependsOrder;

    fn parse(args: &[&str]) -> ArgMatches {
        build_cli().try_get_matches_from(args).unwrap()
    }

    fn sample_tasks() -> Vec<Task> {
        let mut build = Task::shell("build", "cargo").with_args(["build", "--release"]);
        build.group = Some(crate::runner::TaskGroup {
            kind: "build".to_string(),
            is_default: true,
        });
        let lint = Task::process("lint", "cargo").with_args(["clippy"]);
        let test = Task::shell("test", "cargo test")
            .with_depends_on(["build", "lint"], DependsOrder::Parallel);
        vec![build, lint, test]
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_get_verbosity() {
        assert_eq!(get_verbosity(&parse(&["taskjson", "list"])), Verbosity::Normal);
        assert_eq!(get_verbosity(&parse(&["taskjson", "-q", "list"])), Verbosity::Quiet);
        assert_eq!(get_verbosity(&parse(&["taskjson", "list", "-v"])), Verbosity::Verbose);
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        assert!(build_cli()
            .try_get_matches_from(["taskjson", "-v", "-q", "list"])
            .is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let matches = parse(&["taskjson", "info", "build", "--config", "tasks.json"]);
        let globals = GlobalOptions::from_matches(&matches);
        assert_eq!(globals.config, Some(PathBuf::from("tasks.json")));
    }

    #[test]
    fn test_parse_delay() {
        assert_eq!(parse_delay("250"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_delay("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_delay("2s"), Ok(Duration::from_secs(2)));
        assert!(parse_delay("soon").is_err());
    }

    #[test]
    fn test_watch_defaults() {
        let matches = parse(&["taskjson", "watch", "build", "--ext", ".rs,.toml"]);
        let (_, sub) = matches.subcommand().unwrap();
        let excludes: Vec<&String> = sub.get_many::<String>("exclude").unwrap().collect();
        assert_eq!(excludes, vec!["node_modules", ".git", ".vscode"]);
        let exts: Vec<&String> = sub.get_many::<String>("ext").unwrap().collect();
        assert_eq!(exts, vec![".rs", ".toml"]);
        assert_eq!(
            sub.get_one::<Duration>("delay"),
            Some(&Duration::from_millis(500))
        );
    }

    #[test]
    fn test_init_rejects_unknown_template() {
        assert!(build_cli()
            .try_get_matches_from(["taskjson", "init", "-t", "rust"])
            .is_err());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 30), "short");
        let long = "a".repeat(40);
        let cut = truncate(&long, 30);
        assert_eq!(cut.chars().count(), 30);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_filter_tasks() {
        let tasks = sample_tasks();
        let labels = |found: Vec<&Task>| -> Vec<String> {
            found.iter().map(|t| t.label.clone()).collect()
        };
        assert_eq!(labels(filter_tasks(&tasks, None, None)), vec!["build", "lint", "test"]);
        assert_eq!(labels(filter_tasks(&tasks, Some("build"), None)), vec!["build"]);
        assert_eq!(labels(filter_tasks(&tasks, None, Some("process"))), vec!["lint"]);
        assert!(filter_tasks(&tasks, Some("test"), Some("shell")).is_empty());
    }

    #[test]
    fn test_format_task_row() {
        let tasks = sample_tasks();
        let row = format_task_row(&tasks[0]);
        assert!(row.starts_with("build"));
        assert!(row.contains("shell"));
        assert!(row.ends_with("cargo build --release"));
        assert!(format_task_row(&tasks[1]).contains(" - "));
    }

    #[test]
    fn test_info_quiet_line() {
        let tasks = sample_tasks();
        assert_eq!(info_quiet_line(&tasks[0]), "build\tshell\tcargo build --release");
    }

    #[test]
    fn test_write_task_info() {
        let tasks = sample_tasks();
        let mut out = Vec::new();
        write_task_info(
            &mut out,
            &tasks[2],
            &tasks,
            Path::new(".vscode/tasks.json"),
            Verbosity::Normal,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Task: test\n==========\n"));
        assert!(text.contains("Depends On:    build, lint"));
        assert!(text.contains("Depends Order: parallel"));
        assert!(text.contains("  1. build\n  2. lint\n  3. build, lint\n  4. test\n"));
        assert!(!text.contains("Source File"));
    }

    #[test]
    fn test_print_plan() {
        let tasks = sample_tasks();
        let ctx = ExecutionContext::new("/ws")
            .with_cwd("/ws")
            .with_verbosity(Verbosity::Quiet);
        let plan: Vec<&Task> = tasks.iter().collect();
        let mut out = Vec::new();
        print_plan(&mut out, &plan, &ctx).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Execution plan (3 task(s)):"));
        assert!(text.contains("2. lint [process]"));
        assert!(text.contains("   command: cargo clippy"));
        assert!(text.contains("   cwd:     /ws"));
    }
}
