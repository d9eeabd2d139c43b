//! Running a single task through the backend
//!
//! Each step is a precondition: the first one that fails produces a failed
//! [`SyncResult`] and nothing after it runs. In particular the backend is
//! never invoked for a task whose endpoints are missing or unmounted.

use std::path::PathBuf;

use jackup_fs::{SyncPath, is_mount_point, read_ignore_file};
use tracing::{debug, info};

use super::backend::SyncBackend;
use crate::profile::Task;

/// Outcome of one task attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResult {
    pub succeeded: bool,
    pub diagnostic: Option<String>,
}

impl SyncResult {
    pub fn success() -> Self {
        Self {
            succeeded: true,
            diagnostic: None,
        }
    }

    pub fn failure(diagnostic: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

/// Resolves a task's transfer parameters and invokes the backend once.
pub struct SyncExecutor {
    backend: Box<dyn SyncBackend>,
    ignore_file: String,
    home: Option<PathBuf>,
}

impl SyncExecutor {
    pub fn new(backend: Box<dyn SyncBackend>, ignore_file: impl Into<String>) -> Self {
        Self {
            backend,
            ignore_file: ignore_file.into(),
            home: dirs::home_dir(),
        }
    }

    /// Expand `~` against `home` instead of the current user's home.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Attempt one transfer for `task`. Never retries.
    pub fn execute(&self, task: &Task) -> SyncResult {
        let source = SyncPath::with_home(&task.source, self.home.as_deref());
        let destination = SyncPath::with_home(&task.destination, self.home.as_deref());
        info!(task = %task.name, %source, %destination, "Syncing");

        for (path, must_be_mounted) in [
            (&source, task.source_must_be_mounted),
            (&destination, task.destination_must_be_mounted),
        ] {
            if let Err(diagnostic) = check_mounted(path, must_be_mounted) {
                return SyncResult::failure(diagnostic);
            }
        }

        for path in [&source, &destination] {
            if !path.is_remote() && !path.exists() {
                return SyncResult::failure(format!("{} does not exist", path));
            }
        }

        let excludes = match self.merged_excludes(task, &source) {
            Ok(excludes) => excludes,
            Err(e) => return SyncResult::failure(format!("failed to read ignore file: {}", e)),
        };

        let mut options = task.args.clone();
        options.extend(excludes.iter().map(|pattern| format!("--exclude={}", pattern)));

        match self.backend.transfer(&source, &destination, &options) {
            Ok(output) if output.success() => SyncResult::success(),
            Ok(output) => {
                let mut diagnostic = format!(
                    "{} exited with status {}",
                    self.backend.name(),
                    output.exit_status
                );
                if !output.diagnostic.is_empty() {
                    diagnostic = format!("{}\n{}", output.diagnostic, diagnostic);
                }
                SyncResult::failure(diagnostic)
            }
            Err(e) => SyncResult::failure(format!("failed to run {}: {}", self.backend.name(), e)),
        }
    }

    /// Task excludes followed by ignore-file patterns not already present.
    fn merged_excludes(&self, task: &Task, source: &SyncPath) -> jackup_fs::Result<Vec<String>> {
        let mut excludes = task.excludes.clone();
        if source.is_dir() {
            for pattern in read_ignore_file(&source.to_native(), &self.ignore_file)? {
                if !excludes.contains(&pattern) {
                    excludes.push(pattern);
                }
            }
        }
        debug!(task = %task.name, ?excludes, "Resolved excludes");
        Ok(excludes)
    }
}

fn check_mounted(path: &SyncPath, must_be_mounted: bool) -> Result<(), String> {
    if !must_be_mounted {
        return Ok(());
    }
    if path.is_remote() {
        return Err(format!("{} is remote; cannot verify it is mounted", path));
    }
    if !is_mount_point(&path.to_native()) {
        return Err(format!("{} is not mounted", path));
    }
    Ok(())
}
