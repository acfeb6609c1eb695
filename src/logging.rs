//! Diagnostic logging via `tracing`
//!
//! Level priority:
//! 1. `--log-level` flag
//! 2. `TASKJSON_LOG` environment variable (any `EnvFilter` directive)
//! 3. `warn`
//!
//! Log lines go to stderr so they never mix with task output or listings.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Environment variable consulted when no `--log-level` is given
pub const LOG_ENV_VAR: &str = "TASKJSON_LOG";

/// Log levels accepted by `--log-level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Build the filter for the given CLI level, falling back to the environment
pub fn build_filter(cli_level: Option<LogLevel>) -> EnvFilter {
    match cli_level {
        Some(level) => EnvFilter::new(level.as_str()),
        None => EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn")),
    }
}

/// Install the global subscriber
///
/// A second call is a no-op.
pub fn init_logging(cli_level: Option<LogLevel>) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(cli_level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_level_wins() {
        let filter = build_filter(Some(LogLevel::Debug));
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn test_level_names() {
        let names: Vec<&str> = LogLevel::value_variants().iter().map(|l| l.as_str()).collect();
        assert_eq!(names, vec!["error", "warn", "info", "debug", "trace"]);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(Some(LogLevel::Error));
        init_logging(Some(LogLevel::Trace));
    }
}
