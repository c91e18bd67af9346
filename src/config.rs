//! Runtime configuration: where pads live, which pad to open, and logging.

use std::fs;
use std::path::PathBuf;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::pad::UserPad;
use crate::Result;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "PROGRESSPAD_LOG";
/// Pad file used when no user is selected.
pub const DEFAULT_PAD_FILE: &str = "progresspad.json";
const DEFAULT_DIR_NAME: &str = ".progresspad";

/// Resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub pad_path: PathBuf,
    pub user: Option<String>,
}

impl Config {
    /// Resolve from the (already env-merged) CLI values.
    ///
    /// `db` wins over `user`; with neither the shared default pad is used.
    /// The data directory is created when missing.
    pub fn resolve(db: Option<PathBuf>, user: Option<String>, data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        fs::create_dir_all(&data_dir)?;

        let user = user.filter(|u| !u.trim().is_empty());
        let pad_path = match (db, &user) {
            (Some(path), _) => path,
            (None, Some(name)) => UserPad::new(name, &data_dir).file_path,
            (None, None) => data_dir.join(DEFAULT_PAD_FILE),
        };
        debug!(data_dir = %data_dir.display(), pad = %pad_path.display(), "resolved config");
        Ok(Config { data_dir, pad_path, user })
    }
}

fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(DEFAULT_DIR_NAME)
}

/// Install the stderr `fmt` subscriber. Safe to call more than once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
