use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Directory holding the rolling log files (`~/.jarsmith/logs`).
pub fn log_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".jarsmith/logs")
}

/// Installs the global subscriber for one jarsmith process.
///
/// Every run appends to `<log_dir>/<component>.<date>`, so the log of a
/// failed packaging or AOT run survives the terminal session. With
/// `to_stderr` the same events are echoed to the console without targets.
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init_logging(component: &str, to_stderr: bool) -> WorkerGuard {
    let dir = log_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("cannot create log directory {}: {}", dir.display(), e);
    }

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, component));
    let level = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(level).with(
        fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_target(true),
    );
    let console = to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });
    subscriber.with(console).init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_is_under_jarsmith_home() {
        assert!(log_dir().ends_with(".jarsmith/logs"));
    }
}
