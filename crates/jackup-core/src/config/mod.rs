//! Configuration for the orchestrator
//!
//! A single [`Config`] value is resolved once at startup and handed to the
//! profile store, lock manager, backend and controller. Defaults are applied
//! during resolution, so consumers never see a missing setting.
//!
//! # Discovery
//!
//! The first existing file wins:
//!
//! 1. `$JACKUP_CONFIG`
//! 2. `<config_dir>/jackup/jackup.conf`
//! 3. `~/.jackup/jackup.conf`
//! 4. `~/.jackup`
//!
//! Config files are JSON (`.conf`, `.json`, no extension) or TOML (`.toml`).

mod resolver;

pub use resolver::{CONFIG_ENV_VAR, ConfigResolver};

use std::path::{Path, PathBuf};

use jackup_fs::{DEFAULT_IGNORE_FILE, SyncPath};
use serde::{Deserialize, Serialize};

/// File name of the rsync transfer log kept next to the config file.
pub const DEFAULT_LOG_FILE: &str = "jackup.log";

/// Conventional config file name; profiles live right next to it.
pub const CONFIG_FILE_NAME: &str = "jackup.conf";

/// Profile directory used next to any other config file, such as `~/.jackup`.
pub const PROFILES_SUBDIR: &str = ".jackup.d";

/// Default backend executable.
pub const DEFAULT_RSYNC: &str = "rsync";

/// Settings as written in a config file; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Directory holding profile and lock files
    pub dir: Option<String>,
    /// Transfer log handed to the backend
    pub log_path: Option<String>,
    /// Name of the per-source ignore file
    pub ignore_file: Option<String>,
    /// Backend executable
    pub rsync: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The config file this was resolved from (it may not exist)
    pub config_path: PathBuf,
    /// Directory holding `<profile>.json` and `<profile>.lock`
    pub dir: PathBuf,
    /// Transfer log handed to the backend
    pub log_path: PathBuf,
    /// Name of the per-source ignore file
    pub ignore_file: String,
    /// Backend executable
    pub rsync: String,
}

impl Config {
    /// Defaults for a config file at `config_path`.
    pub fn defaults_for(config_path: impl Into<PathBuf>) -> Self {
        Self::from_file(config_path.into(), ConfigFile::default(), None)
    }

    /// Defaults rooted at `dir`, as if `dir/jackup.conf` existed and were empty.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::defaults_for(dir.as_ref().join(CONFIG_FILE_NAME))
    }

    pub(crate) fn from_file(config_path: PathBuf, file: ConfigFile, home: Option<&Path>) -> Self {
        let base = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let expand = |raw: String| SyncPath::with_home(raw, home).to_native();

        let dir = file
            .dir
            .map(expand)
            .unwrap_or_else(|| default_profile_dir(&config_path, &base));
        let log_path = file
            .log_path
            .map(expand)
            .unwrap_or_else(|| base.join(DEFAULT_LOG_FILE));

        Self {
            config_path,
            dir,
            log_path,
            ignore_file: file
                .ignore_file
                .unwrap_or_else(|| DEFAULT_IGNORE_FILE.to_string()),
            rsync: file.rsync.unwrap_or_else(|| DEFAULT_RSYNC.to_string()),
        }
    }
}

/// `jackup.conf` shares its directory with the profiles. Any other file
/// (`~/.jackup`, `jackup.json`) may sit among unrelated JSON files, so its
/// profiles get a directory of their own.
fn default_profile_dir(config_path: &Path, base: &Path) -> PathBuf {
    if config_path.file_name().is_some_and(|name| name == CONFIG_FILE_NAME) {
        base.to_path_buf()
    } else {
        base.join(PROFILES_SUBDIR)
    }
}
