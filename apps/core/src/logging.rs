use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "EDGE_DEFLECTOR_LOG";

const LOG_FILE_NAME: &str = "edge-deflector.log";
const ARCHIVE_PREFIX: &str = "edge-deflector-";
const MAX_LOG_BYTES: u64 = 1_000_000;
const MAX_ARCHIVES: usize = 5;

static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LogError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("failed to install subscriber: {0}")]
    Install(String),
}

pub fn logs_dir() -> PathBuf {
    crate::config::stable_app_data_dir().join("logs")
}

/// Filter directive from the environment. Logging stays off when unset.
pub fn filter_from_env() -> Option<String> {
    std::env::var(LOG_FILTER_ENV)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Routes `tracing` output to a size-rotated file under [`logs_dir`].
pub fn init(filter: &str) -> Result<PathBuf, LogError> {
    init_in(&logs_dir(), filter)
}

pub fn init_in(log_dir: &Path, filter: &str) -> Result<PathBuf, LogError> {
    let filter = EnvFilter::try_new(filter)?;
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(LOG_FILE_NAME);
    rotate_if_needed(&log_path, log_dir)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|error| LogError::Install(error.to_string()))?;

    install_panic_hook();
    Ok(log_path)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn rotate_if_needed(log_path: &Path, log_dir: &Path) -> Result<(), std::io::Error> {
    let meta = match fs::metadata(log_path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };

    if meta.len() < MAX_LOG_BYTES {
        return Ok(());
    }

    let archived = log_dir.join(format!("{ARCHIVE_PREFIX}{}.log", now_secs()));
    fs::rename(log_path, archived)?;
    prune_old_archives(log_dir)?;
    Ok(())
}

fn prune_old_archives(log_dir: &Path) -> Result<(), std::io::Error> {
    let mut archives = fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(ARCHIVE_PREFIX) && n.ends_with(".log"))
                .unwrap_or(false)
        })
        .collect::<Vec<_>>();

    archives.sort();
    let excess = archives.len().saturating_sub(MAX_ARCHIVES);
    for oldest in archives.iter().take(excess) {
        let _ = fs::remove_file(oldest);
    }
    Ok(())
}

fn install_panic_hook() {
    let _ = PANIC_HOOK_INSTALLED.get_or_init(|| {
        let prior = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_else(|| "unknown".to_string());
            let payload = panic_info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic payload unavailable".to_string());
            tracing::error!(%location, %payload, "panic");
            prior(panic_info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{
        filter_from_env, init_in, logs_dir, rotate_if_needed, LogError, LOG_FILE_NAME,
        LOG_FILTER_ENV, MAX_ARCHIVES, MAX_LOG_BYTES,
    };

    #[test]
    fn logs_dir_uses_stable_app_data_layout() {
        let dir = logs_dir();
        assert!(dir
            .to_string_lossy()
            .to_ascii_lowercase()
            .contains("edgedeflector"));
    }

    #[test]
    fn small_log_is_not_rotated() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let log_path = dir.path().join(LOG_FILE_NAME);
        fs::write(&log_path, b"line\n").expect("log should be written");

        rotate_if_needed(&log_path, dir.path()).expect("rotation should succeed");
        assert!(log_path.exists());
    }

    #[test]
    fn oversized_log_is_archived_and_archives_are_pruned() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        for stamp in 0..MAX_ARCHIVES + 2 {
            fs::write(dir.path().join(format!("edge-deflector-{stamp:03}.log")), b"old")
                .expect("archive should be written");
        }
        let log_path = dir.path().join(LOG_FILE_NAME);
        fs::write(&log_path, vec![b'x'; MAX_LOG_BYTES as usize]).expect("log should be written");

        rotate_if_needed(&log_path, dir.path()).expect("rotation should succeed");

        assert!(!log_path.exists());
        let archives = fs::read_dir(dir.path())
            .expect("dir should be readable")
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("edge-deflector-")
            })
            .count();
        assert_eq!(archives, MAX_ARCHIVES);
        assert!(!dir.path().join("edge-deflector-000.log").exists());
    }

    #[test]
    fn filter_comes_from_environment_when_non_blank() {
        std::env::remove_var(LOG_FILTER_ENV);
        assert_eq!(filter_from_env(), None);

        std::env::set_var(LOG_FILTER_ENV, "   ");
        assert_eq!(filter_from_env(), None);

        std::env::set_var(LOG_FILTER_ENV, " edge_deflector_core=debug ");
        assert_eq!(filter_from_env().as_deref(), Some("edge_deflector_core=debug"));

        std::env::remove_var(LOG_FILTER_ENV);
    }

    #[test]
    fn invalid_filter_is_rejected_before_touching_disk() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let log_dir = dir.path().join("logs");

        let result = init_in(&log_dir, "edge_deflector_core=loud");
        assert!(matches!(result, Err(LogError::Filter(_))));
        assert!(!log_dir.exists());
    }
}
