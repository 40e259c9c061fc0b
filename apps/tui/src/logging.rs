//! File logging. The dashboard owns the terminal, so nothing is written to stdout or stderr.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber; keep the guard alive so buffered lines get flushed.
pub fn init_logging(log_file: &Path, debug: bool) -> color_eyre::Result<WorkerGuard> {
    let (dir, file_name) = split_log_path(log_file);
    std::fs::create_dir_all(&dir)?;

    let file_appender = tracing_appender::rolling::never(&dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter(debug))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()?;

    tracing::info!(path = %log_file.display(), "logging initialized");
    Ok(guard)
}

/// `--debug` wins over `RUST_LOG`.
fn env_filter(debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new("debug,sqlx=warn,hyper=info,reqwest=info");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"))
}

fn split_log_path(log_file: &Path) -> (PathBuf, PathBuf) {
    let dir = log_file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let file_name = log_file
        .file_name()
        .map_or_else(|| PathBuf::from("crisis-docs.log"), PathBuf::from);
    (dir, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_file_names_log_to_the_working_directory() {
        let (dir, file) = split_log_path(Path::new("crisis-docs.log"));
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(file, PathBuf::from("crisis-docs.log"));

        let (dir, file) = split_log_path(Path::new("/var/log/docs/app.log"));
        assert_eq!(dir, PathBuf::from("/var/log/docs"));
        assert_eq!(file, PathBuf::from("app.log"));
    }
}
