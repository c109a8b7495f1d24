use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LEVEL: &str = "info";
const DEFAULT_LOG_FILE: &str = "gofi.log";

/// Where and how verbosely the agent logs, from `TRACING_LEVEL` and
/// `LOG_FILE_PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub dir: PathBuf,
    pub file_name: PathBuf,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_vars(env::var("TRACING_LEVEL").ok(), env::var("LOG_FILE_PATH").ok())
    }

    fn from_vars(level: Option<String>, log_file: Option<String>) -> Self {
        let level = level
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LEVEL.to_string());
        let log_file = log_file
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string());

        let path = Path::new(&log_file);
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

        LogSettings {
            level,
            dir,
            file_name,
        }
    }
}

/// Console output goes to stderr: stdout is reserved for dry-run records.
pub fn init_logger() -> WorkerGuard {
    let settings = LogSettings::from_env();

    let file_appender = tracing_appender::rolling::never(&settings.dir, &settings.file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .pretty()
        .with_file(false)
        .without_time()
        .with_ansi(true);
    let file = fmt::layer()
        .with_writer(file_writer)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .with(EnvFilter::new(&settings.level))
        .init();

    debug!(
        "Logging at {} to {}",
        settings.level,
        settings.dir.join(&settings.file_name).display()
    );

    guard
}
