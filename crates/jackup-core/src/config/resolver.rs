//! Config file discovery

use std::path::{Path, PathBuf};

use jackup_fs::{ConfigStore, SyncPath};

use super::{CONFIG_FILE_NAME, Config, ConfigFile};
use crate::{Error, Result};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "JACKUP_CONFIG";

/// Locates and loads the config file.
///
/// The platform directories are captured at construction, so tests can point
/// the resolver at temporary directories without touching the real user
/// config.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    env_override: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    home: Option<PathBuf>,
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigResolver {
    /// Create a resolver for the current user and environment.
    pub fn new() -> Self {
        let home = dirs::home_dir();
        let env_override = std::env::var(CONFIG_ENV_VAR)
            .ok()
            .filter(|v| !v.is_empty())
            .map(|v| SyncPath::with_home(v, home.as_deref()).to_native());

        Self {
            env_override,
            config_dir: dirs::config_dir(),
            home,
        }
    }

    /// Create a resolver with explicit directories and no environment override.
    pub fn with_dirs(config_dir: Option<PathBuf>, home: Option<PathBuf>) -> Self {
        Self {
            env_override: None,
            config_dir,
            home,
        }
    }

    /// Use `path` as if it had been given in `$JACKUP_CONFIG`.
    pub fn with_env_override(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_override = Some(path.into());
        self
    }

    /// Candidate config files, in the order they are checked.
    pub fn candidates(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(ref p) = self.env_override {
            paths.push(p.clone());
        }
        if let Some(ref dir) = self.config_dir {
            paths.push(dir.join("jackup").join(CONFIG_FILE_NAME));
        }
        if let Some(ref home) = self.home {
            paths.push(home.join(".jackup").join(CONFIG_FILE_NAME));
            paths.push(home.join(".jackup"));
        }
        paths
    }

    /// The config file in use: the first candidate that is a file, otherwise
    /// the nominal location under the platform config directory.
    pub fn locate(&self) -> PathBuf {
        if let Some(found) = self.candidates().into_iter().find(|p| p.is_file()) {
            tracing::debug!(path = %found.display(), "Using config file");
            return found;
        }

        let nominal = match (&self.config_dir, &self.home) {
            (Some(dir), _) => dir.join("jackup").join(CONFIG_FILE_NAME),
            (None, Some(home)) => home.join(".jackup").join(CONFIG_FILE_NAME),
            (None, None) => PathBuf::from(CONFIG_FILE_NAME),
        };
        tracing::debug!(path = %nominal.display(), "No config file found, using defaults");
        nominal
    }

    /// Resolve the configuration from the discovered file, or defaults.
    pub fn resolve(&self) -> Result<Config> {
        let path = self.locate();
        if path.is_file() {
            self.load(&path)
        } else {
            Ok(Config::from_file(path, ConfigFile::default(), self.home.as_deref()))
        }
    }

    /// Load an explicitly named config file. Unlike [`resolve`](Self::resolve),
    /// a missing file is an error.
    pub fn load(&self, path: &Path) -> Result<Config> {
        if !path.is_file() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let file: ConfigFile = ConfigStore::new().load(path)?;
        tracing::debug!(?file, "Loaded config file");
        Ok(Config::from_file(path.to_path_buf(), file, self.home.as_deref()))
    }
}
