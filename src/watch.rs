//! File watching for `taskjson watch`
//!
//! A `notify` watcher feeds a channel; [`run_debounced`] drains it and calls
//! back once the filesystem has been quiet for the configured delay.

use anyhow::{Context as _, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Directories ignored unless `--exclude` says otherwise
pub const DEFAULT_EXCLUDES: &[&str] = &["node_modules", ".git", ".vscode"];

/// Default quiet period before re-running
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Decides which filesystem events trigger a re-run
#[derive(Debug, Clone)]
pub struct WatchFilter {
    base: PathBuf,
    extensions: Vec<String>,
    excludes: Vec<String>,
    globs: Option<GlobSet>,
}

impl WatchFilter {
    /// Build a filter; `globs` are matched against paths relative to `base`
    pub fn new(
        base: impl Into<PathBuf>,
        extensions: &[String],
        excludes: &[String],
        globs: &[String],
    ) -> Result<Self> {
        let globs = if globs.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in globs {
                let glob =
                    Glob::new(pattern).with_context(|| format!("invalid glob '{}'", pattern))?;
                builder.add(glob);
            }
            Some(builder.build()?)
        };

        Ok(WatchFilter {
            base: base.into(),
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            excludes: excludes.to_vec(),
            globs,
        })
    }

    /// Only file creation and content changes are of interest
    pub fn should_handle(&self, event: &Event) -> bool {
        let relevant = match event.kind {
            EventKind::Create(_) => true,
            EventKind::Modify(ModifyKind::Metadata(_)) => false,
            EventKind::Modify(_) => true,
            _ => false,
        };
        relevant && event.paths.iter().any(|p| self.matches_path(p))
    }

    /// Apply the extension, exclude and glob rules to one path
    pub fn matches_path(&self, path: &Path) -> bool {
        let display = path.to_string_lossy();
        if self.excludes.iter().any(|e| display.contains(e.as_str())) {
            return false;
        }

        if !self.extensions.is_empty() {
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_lowercase())
                .unwrap_or_default();
            if !self.extensions.contains(&ext) {
                return false;
            }
        }

        match &self.globs {
            Some(set) => {
                let relative = path.strip_prefix(&self.base).unwrap_or(path);
                set.is_match(relative)
            }
            None => true,
        }
    }
}

/// Watch `paths` recursively until the watcher goes away
///
/// `on_change` runs on the calling thread after each quiet period.
pub fn watch_paths<F>(
    paths: &[PathBuf],
    filter: &WatchFilter,
    delay: Duration,
    on_change: F,
) -> Result<()>
where
    F: FnMut(),
{
    let (tx, rx) = mpsc::channel();
    let mut watcher: RecommendedWatcher =
        notify::recommended_watcher(tx).context("failed to create file watcher")?;

    for path in paths {
        watcher
            .watch(path, RecursiveMode::Recursive)
            .with_context(|| format!("failed to watch path {}", path.display()))?;
        info!(path = %path.display(), "watching");
    }

    run_debounced(&rx, filter, delay, on_change);
    Ok(())
}

/// Drain `rx`, calling `on_change` once per burst of matching events
///
/// Returns the number of callbacks made once every sender is gone.
pub fn run_debounced<F>(
    rx: &Receiver<notify::Result<Event>>,
    filter: &WatchFilter,
    delay: Duration,
    mut on_change: F,
) -> usize
where
    F: FnMut(),
{
    let mut runs = 0;

    loop {
        // idle: block until something relevant happens
        match rx.recv() {
            Ok(Ok(event)) if filter.should_handle(&event) => {
                debug!(paths = ?event.paths, "change detected");
            }
            Ok(Ok(_)) => continue,
            Ok(Err(e)) => {
                warn!(error = %e, "watch error");
                continue;
            }
            Err(_) => return runs,
        }

        // pending: wait for the burst to settle
        let disconnected = loop {
            match rx.recv_timeout(delay) {
                Ok(Ok(event)) if filter.should_handle(&event) => {
                    debug!(paths = ?event.paths, "change detected, delaying");
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!(error = %e, "watch error"),
                Err(RecvTimeoutError::Timeout) => break false,
                Err(RecvTimeoutError::Disconnected) => break true,
            }
        };

        on_change();
        runs += 1;

        if disconnected {
            return runs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, RemoveKind};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    fn modify(path: &str) -> Event {
        event(EventKind::Modify(ModifyKind::Data(DataChange::Content)), path)
    }

    fn default_filter() -> WatchFilter {
        WatchFilter::new("/ws", &[], &strings(DEFAULT_EXCLUDES), &[]).unwrap()
    }

    #[test]
    fn test_event_kinds() {
        let filter = default_filter();
        assert!(filter.should_handle(&modify("/ws/src/main.go")));
        assert!(filter.should_handle(&event(EventKind::Create(CreateKind::File), "/ws/a.go")));
        assert!(!filter.should_handle(&event(EventKind::Remove(RemoveKind::File), "/ws/a.go")));
        assert!(!filter.should_handle(&event(EventKind::Access(AccessKind::Any), "/ws/a.go")));
        assert!(!filter.should_handle(&event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            "/ws/a.go"
        )));
    }

    #[test]
    fn test_default_excludes() {
        let filter = default_filter();
        assert!(!filter.matches_path(Path::new("/ws/node_modules/x/index.js")));
        assert!(!filter.matches_path(Path::new("/ws/.git/HEAD")));
        assert!(!filter.matches_path(Path::new("/ws/.vscode/tasks.json")));
        assert!(filter.matches_path(Path::new("/ws/src/index.js")));
    }

    #[test]
    fn test_extensions_case_insensitive() {
        let filter = WatchFilter::new("/ws", &strings(&[".go", "JS"]), &[], &[]).unwrap();
        assert!(filter.matches_path(Path::new("/ws/main.GO")));
        assert!(filter.matches_path(Path::new("/ws/app.js")));
        assert!(!filter.matches_path(Path::new("/ws/README.md")));
        assert!(!filter.matches_path(Path::new("/ws/Makefile")));
    }

    #[test]
    fn test_globs_relative_to_base() {
        let filter = WatchFilter::new("/ws", &[], &[], &strings(&["src/**/*.rs"])).unwrap();
        assert!(filter.matches_path(Path::new("/ws/src/runner/task.rs")));
        assert!(!filter.matches_path(Path::new("/ws/tests/cli.rs")));
    }

    #[test]
    fn test_invalid_glob() {
        assert!(WatchFilter::new("/ws", &[], &[], &strings(&["src/[.rs"])).is_err());
    }

    #[test]
    fn test_burst_runs_once() {
        let (tx, rx) = mpsc::channel();
        for _ in 0..5 {
            tx.send(Ok(modify("/ws/main.go"))).unwrap();
        }
        drop(tx);

        let mut calls = 0;
        let runs = run_debounced(&rx, &default_filter(), Duration::from_millis(10), || calls += 1);
        assert_eq!(runs, 1);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_ignored_events_do_not_run() {
        let (tx, rx) = mpsc::channel();
        tx.send(Ok(modify("/ws/node_modules/pkg/index.js"))).unwrap();
        tx.send(Ok(event(EventKind::Remove(RemoveKind::File), "/ws/a.go")))
            .unwrap();
        drop(tx);

        let runs = run_debounced(&rx, &default_filter(), Duration::from_millis(10), || {});
        assert_eq!(runs, 0);
    }

    #[test]
    fn test_separate_bursts_run_separately() {
        let (tx, rx) = mpsc::channel();
        let sender = std::thread::spawn(move || {
            tx.send(Ok(modify("/ws/a.go"))).unwrap();
            std::thread::sleep(Duration::from_millis(200));
            tx.send(Ok(modify("/ws/b.go"))).unwrap();
        });

        let runs = run_debounced(&rx, &default_filter(), Duration::from_millis(20), || {});
        sender.join().unwrap();
        assert_eq!(runs, 2);
    }
}
