//! [`TestProfiles`] builder for orchestrator test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use jackup_core::{
    Config, JsonProfileStore, LockManager, ProfileSyncController, SyncExecutor, TaskRecord,
};
use tempfile::TempDir;

use crate::RecordingBackend;

/// A temporary jackup config directory.
///
/// Profiles and lock files live directly in the root, as with a default
/// config. Task endpoints are created under `data/<profile>/<task>/{src,dst}`.
///
/// # Example
///
/// ```rust,no_run
/// use jackup_test_utils::{RecordingBackend, TestProfiles};
///
/// let profiles = TestProfiles::new();
/// profiles.add_task("music", "flac", 1);
/// let backend = RecordingBackend::new();
/// let summary = profiles.controller(&backend).sync(&["music"]);
/// assert_eq!(summary.results[0].completed, 1);
/// profiles.assert_unlocked("music");
/// ```
pub struct TestProfiles {
    temp_dir: TempDir,
}

impl Default for TestProfiles {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProfiles {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Default configuration rooted at [`root`](Self::root).
    pub fn config(&self) -> Config {
        Config::in_dir(self.root())
    }

    /// Write `jackup.conf` with the given JSON content.
    pub fn write_config(&self, content: &serde_json::Value) -> PathBuf {
        let path = self.root().join("jackup.conf");
        fs::write(&path, serde_json::to_string_pretty(content).unwrap()).unwrap();
        path
    }

    pub fn store(&self) -> JsonProfileStore {
        JsonProfileStore::for_config(&self.config())
    }

    pub fn locks(&self) -> LockManager {
        LockManager::new(self.root())
    }

    /// Create `data/<profile>/<task>/{src,dst}` and return both paths.
    pub fn endpoints(&self, profile: &str, task: &str) -> (String, String) {
        let base = self.root().join("data").join(profile).join(task);
        let src = base.join("src");
        let dst = base.join("dst");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        (
            src.to_string_lossy().into_owned(),
            dst.to_string_lossy().into_owned(),
        )
    }

    /// Add a task whose endpoints exist, creating the profile if needed.
    pub fn add_task(&self, profile: &str, task: &str, order: i64) -> TaskRecord {
        let (src, dst) = self.endpoints(profile, task);
        self.add_record(profile, task, TaskRecord::new(src, dst).with_order(order))
    }

    /// Add a task from an explicit record.
    pub fn add_record(&self, profile: &str, task: &str, record: TaskRecord) -> TaskRecord {
        self.store()
            .add_task(profile, task, record)
            .unwrap_or_else(|e| panic!("TestProfiles::add_record {profile}/{task}: {e}"))
            .to_record()
    }

    /// Write a profile file verbatim.
    pub fn write_profile(&self, profile: &str, content: &serde_json::Value) {
        let path = self.store().profile_path(profile);
        fs::write(path, serde_json::to_string_pretty(content).unwrap()).unwrap();
    }

    pub fn lock_path(&self, profile: &str) -> PathBuf {
        self.locks().lock_path(profile)
    }

    /// A controller over this directory that transfers through `backend`.
    pub fn controller(&self, backend: &RecordingBackend) -> ProfileSyncController {
        let config = self.config();
        let executor = SyncExecutor::new(backend.boxed(), config.ignore_file).with_home(None);
        ProfileSyncController::new(Box::new(self.store()), self.locks(), executor)
    }

    /// Assert that no lock file exists for `profile`.
    ///
    /// # Panics
    /// Panics with a descriptive message if the lock file exists.
    pub fn assert_unlocked(&self, profile: &str) {
        let path = self.lock_path(profile);
        assert!(!path.exists(), "Expected no lock file: {}", path.display());
    }

    /// Assert that the lock file for `profile` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the lock file does not exist.
    pub fn assert_locked(&self, profile: &str) {
        let path = self.lock_path(profile);
        assert!(path.exists(), "Expected lock file: {}", path.display());
    }
}
