//! Per-profile run locks
//!
//! A profile is locked while it is being synchronized so that a second
//! `jackup sync` of the same profile refuses to start. The lock is a sentinel
//! file `<dir>/<profile>.lock` created with a single exclusive-create call;
//! whoever creates it holds the lock, and deleting it releases the lock.
//!
//! Ownership is not verified on release, and a lock left behind by a crashed
//! process is not expired automatically. The file records the holder's pid
//! and start time so the situation can be diagnosed and cleared by hand.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Result;

const LOCK_EXT: &str = "lock";

/// Diagnostic content of a lock file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Process that created the lock
    pub pid: u32,
    /// When the lock was created
    pub acquired_at: DateTime<Local>,
}

impl LockInfo {
    fn current() -> Self {
        Self {
            pid: std::process::id(),
            acquired_at: Local::now(),
        }
    }
}

/// Creates and removes profile lock files in one directory.
#[derive(Debug, Clone)]
pub struct LockManager {
    dir: PathBuf,
}

impl LockManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the lock file for `profile`.
    pub fn lock_path(&self, profile: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", profile, LOCK_EXT))
    }

    /// Try to take the lock for `profile`.
    ///
    /// Returns `Ok(false)` if the lock is already held; that is the expected
    /// contention signal, not an error. Of any number of concurrent callers,
    /// in this or other processes, at most one receives `Ok(true)`.
    pub fn acquire(&self, profile: &str) -> Result<bool> {
        std::fs::create_dir_all(&self.dir).map_err(|e| jackup_fs::Error::io(&self.dir, e))?;

        let payload = serde_json::to_vec(&LockInfo::current())?;
        let path = self.lock_path(profile);
        let acquired = jackup_fs::io::create_exclusive(&path, &payload)?;

        debug!(profile, acquired, path = %path.display(), "Lock attempt");
        Ok(acquired)
    }

    /// Take the lock and return a guard that releases it when dropped.
    ///
    /// Returns `Ok(None)` if the lock is already held.
    pub fn try_lock(&self, profile: &str) -> Result<Option<LockGuard<'_>>> {
        if self.acquire(profile)? {
            Ok(Some(LockGuard {
                manager: self,
                profile: profile.to_string(),
                released: false,
            }))
        } else {
            Ok(None)
        }
    }

    /// Release the lock for `profile`. Releasing a lock that is not held is a
    /// no-op.
    pub fn release(&self, profile: &str) -> Result<()> {
        let removed = jackup_fs::io::remove_if_present(&self.lock_path(profile))?;
        debug!(profile, removed, "Lock released");
        Ok(())
    }

    pub fn is_locked(&self, profile: &str) -> bool {
        self.lock_path(profile).exists()
    }

    /// Who holds the lock, if it is held and its content is readable.
    pub fn holder(&self, profile: &str) -> Option<LockInfo> {
        let content = std::fs::read(self.lock_path(profile)).ok()?;
        serde_json::from_slice(&content).ok()
    }
}

/// A held profile lock. Dropping the guard releases the lock, so every exit
/// path out of the scope that owns it, including unwinding, unlocks the
/// profile.
#[derive(Debug)]
pub struct LockGuard<'a> {
    manager: &'a LockManager,
    profile: String,
    released: bool,
}

impl LockGuard<'_> {
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Release now and report any error, instead of logging it on drop.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.manager.release(&self.profile)
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.manager.release(&self.profile) {
            warn!(profile = %self.profile, error = %e, "Failed to release lock");
        }
    }
}
