//! End-to-end scenarios across the workspace crates
//!
//! Each scenario starts from a config file on disk, resolves it the way the
//! CLI does, and runs profiles through the real rsync driver pointed at a
//! shell script that records its arguments.

#![cfg(unix)]

use jackup_core::{
    ConfigResolver, JsonProfileStore, ProfileStatus, ProfileSyncController, ProfileStore,
    TaskRecord,
};
use jackup_test_utils::{RecordingBackend, TestProfiles};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Write an rsync stand-in that appends its arguments, one call per line,
/// to `calls.log` and exits with `status` when its source contains `fail_on`.
fn fake_rsync(dir: &Path, fail_on: &str, status: i32) -> PathBuf {
    let path = dir.join("fake-rsync");
    let log = dir.join("calls.log");
    let body = format!(
        r#"#!/bin/sh
echo "$@" >> '{log}'
for last; do :; done
case "$*" in
  *{fail_on}*) echo "rsync: failed on $last" >&2; exit {status} ;;
esac
exit 0
"#,
        log = log.display(),
        fail_on = fail_on,
        status = status,
    );
    fs::write(&path, body).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn calls(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(String::from)
        .collect()
}

fn endpoints(root: &Path, name: &str) -> (String, String) {
    let src = root.join("data").join(name).join("src");
    let dst = root.join("data").join(name).join("dst");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dst).unwrap();
    (
        src.to_string_lossy().into_owned(),
        dst.to_string_lossy().into_owned(),
    )
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn config_file_drives_store_locks_and_backend() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let rsync = fake_rsync(root, "never-matches", 1);
    let config_path = root.join("jackup.conf");
    fs::write(
        &config_path,
        json!({
            "dir": root.join("profiles").to_string_lossy(),
            "ignore_file": ".syncignore",
            "rsync": rsync.to_string_lossy(),
        })
        .to_string(),
    )
    .unwrap();

    let config = ConfigResolver::with_dirs(None, None)
        .with_env_override(&config_path)
        .resolve()
        .unwrap();
    assert_eq!(config.dir, root.join("profiles"));
    assert_eq!(config.log_path, root.join("jackup.log"));

    let store = JsonProfileStore::new(&config.dir);
    let (src, dst) = endpoints(root, "docs");
    fs::write(Path::new(&src).join(".syncignore"), "*.o\n").unwrap();
    store
        .add_task("work", "docs", TaskRecord::new(&src, &dst).with_order(1))
        .unwrap();

    let summary = ProfileSyncController::from_config(&config).sync(&["work"]);

    assert_eq!(summary.results[0].status, ProfileStatus::Completed);
    assert_eq!((summary.results[0].completed, summary.results[0].total), (1, 1));

    let calls = calls(root);
    assert_eq!(calls.len(), 1);
    let expected_log = format!("--log-file={}", root.join("jackup.log").display());
    assert!(calls[0].starts_with(&expected_log), "call: {}", calls[0]);
    assert!(calls[0].contains("--exclude=*.o"), "call: {}", calls[0]);
    assert!(calls[0].ends_with(&format!("{} {}", src, dst)), "call: {}", calls[0]);
    assert!(!config.dir.join("work.lock").exists());
}

#[test]
fn json_config_next_to_profiles_is_not_synced() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let rsync = fake_rsync(root, "never-matches", 1);
    let config_path = root.join("jackup.json");
    fs::write(
        &config_path,
        json!({
            "dir": root.to_string_lossy(),
            "rsync": rsync.to_string_lossy(),
        })
        .to_string(),
    )
    .unwrap();

    let config = ConfigResolver::with_dirs(None, None).load(&config_path).unwrap();
    let store = JsonProfileStore::for_config(&config);
    let (src, dst) = endpoints(root, "docs");
    store
        .add_task("work", "docs", TaskRecord::new(&src, &dst))
        .unwrap();

    let controller = ProfileSyncController::from_config(&config);
    let profiles = controller.list_profiles().unwrap();
    assert_eq!(profiles, vec!["work"]);

    let summary = controller.sync(&profiles);
    assert!(summary.is_success());
    assert_eq!(calls(root).len(), 1);
}

#[test]
fn rsync_failure_is_isolated_to_its_task() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let rsync = fake_rsync(root, "/broken/", 23);
    fs::write(
        root.join("jackup.conf"),
        json!({ "rsync": rsync.to_string_lossy() }).to_string(),
    )
    .unwrap();
    let config = ConfigResolver::with_dirs(None, None)
        .load(&root.join("jackup.conf"))
        .unwrap();

    let store = JsonProfileStore::new(&config.dir);
    for (name, order) in [("broken", 1), ("fine", 2)] {
        let (src, dst) = endpoints(root, name);
        store
            .add_task("home", name, TaskRecord::new(src, dst).with_order(order))
            .unwrap();
    }

    let summary = ProfileSyncController::from_config(&config).sync(&["home"]);
    let result = &summary.results[0];

    assert_eq!(calls(root).len(), 2);
    assert_eq!((result.completed, result.total), (1, 2));
    let diagnostic = result.tasks[0].result.diagnostic.clone().unwrap();
    assert!(diagnostic.contains("rsync: failed on"), "diagnostic: {}", diagnostic);
    assert!(diagnostic.contains("exited with status 23"), "diagnostic: {}", diagnostic);
    assert!(!summary.is_success());
    assert!(!config.dir.join("home.lock").exists());
}

#[test]
fn missing_rsync_binary_fails_each_task_and_unlocks() {
    let profiles = TestProfiles::new();
    profiles.add_task("home", "a", 1);
    profiles.add_task("home", "b", 2);
    let mut config = profiles.config();
    config.rsync = profiles.root().join("no-such-rsync").to_string_lossy().into_owned();

    let summary = ProfileSyncController::from_config(&config).sync(&["home"]);
    let result = &summary.results[0];

    assert_eq!((result.completed, result.total), (0, 2));
    assert!(
        result.tasks[0]
            .result
            .diagnostic
            .as_deref()
            .unwrap()
            .starts_with("failed to run")
    );
    profiles.assert_unlocked("home");
}

#[test]
fn edits_between_runs_change_the_next_run_only() {
    let profiles = TestProfiles::new();
    profiles.add_task("home", "a", 1);
    profiles.add_task("home", "b", 2);
    let backend = RecordingBackend::new();

    profiles.controller(&backend).sync(&["home"]);
    profiles
        .store()
        .edit_task(
            "home",
            "b",
            jackup_core::TaskEdit {
                order: Some(0),
                ..Default::default()
            },
        )
        .unwrap();
    profiles.controller(&backend).sync(&["home"]);

    assert_eq!(backend.keys(), vec!["a", "b", "b", "a"]);
}

#[test]
fn removed_profile_is_reported_missing() {
    let profiles = TestProfiles::new();
    profiles.add_task("home", "a", 1);
    let store = profiles.store();
    store.remove_profile("home").unwrap();
    assert!(!store.exists("home"));

    let summary = profiles.controller(&RecordingBackend::new()).sync(&["home"]);
    assert_eq!(summary.results[0].status, ProfileStatus::NotFound);
}
