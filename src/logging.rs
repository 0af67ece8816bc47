//! Logging setup. The terminal belongs to the UI, so events go to a file.
//!
//! Filter priority: `PROMPT_TAGS_LOG` > `RUST_LOG` > `warn,prompt_tags=info`.
//! A bare level in `PROMPT_TAGS_LOG` (e.g. `debug`) applies to this crate only.
//!
//! The file defaults to `<temp dir>/prompt-tags-<pid>.log`.

use std::{
    env,
    path::{Path, PathBuf},
};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const ENV_VAR: &str = "PROMPT_TAGS_LOG";
const DEFAULT_FILTER: &str = "warn,prompt_tags=info";

/// Returned from [`init`]; dropping it flushes and stops the file writer.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

pub fn init(log_file: Option<PathBuf>) -> anyhow::Result<LogGuard> {
    let (dir, filename) = resolve_log_path(log_file);
    std::fs::create_dir_all(&dir).ok();

    let file_appender = tracing_appender::rolling::never(&dir, &filename);
    let (writer, file_guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(create_filter()),
        )
        .try_init()?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: dir.join(filename),
    })
}

/// Stdout logging for tests; safe to call more than once.
pub fn test() {
    let _ = fmt()
        .with_env_filter(create_filter())
        .with_test_writer()
        .try_init();
}

fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("prompt-tags-{}.log", std::process::id());
    match override_path {
        Some(path) if path.extension().is_some() => {
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or(filename);
            (dir, name)
        }
        Some(dir) => (dir, filename),
        None => (env::temp_dir(), filename),
    }
}

fn create_filter() -> EnvFilter {
    if let Ok(value) = env::var(ENV_VAR) {
        return expand_level(&value);
    }
    if let Ok(value) = env::var("RUST_LOG") {
        return EnvFilter::new(value);
    }
    EnvFilter::new(DEFAULT_FILTER)
}

fn expand_level(value: &str) -> EnvFilter {
    if value.contains('=') || value.contains(',') {
        return EnvFilter::new(value);
    }
    EnvFilter::new(format!("warn,prompt_tags={value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_file_is_split_into_dir_and_name() {
        let (dir, name) = resolve_log_path(Some(PathBuf::from("/var/log/tags.log")));
        assert_eq!(dir, PathBuf::from("/var/log"));
        assert_eq!(name, "tags.log");
    }

    #[test]
    fn directory_override_gets_default_name() {
        let (dir, name) = resolve_log_path(Some(PathBuf::from("/var/log/prompt")));
        assert_eq!(dir, PathBuf::from("/var/log/prompt"));
        assert!(name.starts_with("prompt-tags-"));
    }

    #[test]
    fn default_goes_to_temp_dir() {
        let (dir, _) = resolve_log_path(None);
        assert_eq!(dir, env::temp_dir());
    }

    #[test]
    fn test_logging_can_be_installed_twice() {
        test();
        test();
    }
}
