//! Profile runs through the controller: locking, ordering, failure isolation

use jackup_core::{
    Interrupt, ProfileResult, ProfileStatus, ProfileStore, ProfileSyncController, Result,
    RunState, SyncExecutor, SyncObserver, SyncTier, Task, TaskRecord,
};
use jackup_test_utils::{RecordingBackend, TestProfiles};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn tasks_run_in_order() {
    let profiles = TestProfiles::new();
    profiles.add_task("home", "a", 2);
    profiles.add_task("home", "b", 1);
    profiles.add_task("home", "c", 3);
    let backend = RecordingBackend::new();

    let summary = profiles.controller(&backend).sync(&["home"]);

    assert_eq!(backend.keys(), vec!["b", "a", "c"]);
    let result = &summary.results[0];
    assert_eq!(result.status, ProfileStatus::Completed);
    assert_eq!((result.completed, result.total), (3, 3));
    assert_eq!(result.tier(), SyncTier::Full);
    assert_eq!(result.final_state, RunState::Done);
    profiles.assert_unlocked("home");
}

#[test]
fn equal_orders_run_by_name() {
    let profiles = TestProfiles::new();
    profiles.add_task("home", "zeta", 1);
    profiles.add_task("home", "alpha", 1);
    profiles.add_task("home", "mid", 0);
    let backend = RecordingBackend::new();

    profiles.controller(&backend).sync(&["home"]);
    profiles.controller(&backend).sync(&["home"]);

    assert_eq!(
        backend.keys(),
        vec!["mid", "alpha", "zeta", "mid", "alpha", "zeta"]
    );
}

#[test]
fn failed_task_does_not_stop_the_rest() {
    let profiles = TestProfiles::new();
    profiles.add_task("home", "a", 1);
    profiles.add_task("home", "b", 2);
    let backend = RecordingBackend::new().exit_status_for("a", 23);

    let summary = profiles.controller(&backend).sync(&["home"]);

    assert_eq!(backend.keys(), vec!["a", "b"]);
    let result = &summary.results[0];
    assert_eq!((result.completed, result.total), (1, 2));
    assert_eq!(result.tier(), SyncTier::Partial);
    assert!(result.is_failure());

    let failed: Vec<_> = result.failed_tasks().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].task, "a");
    assert!(
        failed[0]
            .result
            .diagnostic
            .as_deref()
            .unwrap()
            .contains("exited with status 23")
    );
    profiles.assert_unlocked("home");
}

#[test]
fn every_task_failing_is_a_total_failure() {
    let profiles = TestProfiles::new();
    profiles.add_task("home", "a", 1);
    profiles.add_task("home", "b", 2);
    let backend = RecordingBackend::new()
        .exit_status_for("a", 1)
        .exit_status_for("b", 12);

    let summary = profiles.controller(&backend).sync(&["home"]);

    assert_eq!(summary.results[0].tier(), SyncTier::Failed);
    assert_eq!(summary.results[0].status, ProfileStatus::Completed);
    profiles.assert_unlocked("home");
}

#[test]
fn held_lock_runs_nothing() {
    let profiles = TestProfiles::new();
    profiles.add_task("home", "a", 1);
    assert!(profiles.locks().acquire("home").unwrap());
    let backend = RecordingBackend::new();

    let summary = profiles.controller(&backend).sync(&["home"]);

    assert!(backend.invocations().is_empty());
    let result = &summary.results[0];
    assert!(matches!(
        result.status,
        ProfileStatus::AlreadyRunning { holder: Some(ref info) } if info.pid == std::process::id()
    ));
    assert!(!result.status.ran());
    assert_eq!(result.final_state, RunState::Aborted);
    assert!(result.is_failure());
    // The other run's lock is left alone.
    profiles.assert_locked("home");
}

#[test]
fn contention_on_one_profile_does_not_block_another() {
    let profiles = TestProfiles::new();
    profiles.add_task("p1", "a", 1);
    profiles.add_task("p2", "b", 1);
    profiles.add_task("p2", "c", 2);
    assert!(profiles.locks().acquire("p1").unwrap());
    let backend = RecordingBackend::new();

    let summary = profiles.controller(&backend).sync(&["p1", "p2"]);

    assert_eq!(backend.keys(), vec!["b", "c"]);
    assert!(matches!(summary.results[0].status, ProfileStatus::AlreadyRunning { .. }));
    assert_eq!(summary.results[1].status, ProfileStatus::Completed);
    assert_eq!((summary.results[1].completed, summary.results[1].total), (2, 2));
    assert_eq!(summary.failures().count(), 1);
    profiles.assert_unlocked("p2");
}

#[test]
fn missing_profile_is_reported_without_locking() {
    let profiles = TestProfiles::new();
    profiles.add_task("real", "a", 1);
    let backend = RecordingBackend::new();

    let summary = profiles.controller(&backend).sync(&["ghost", "real"]);

    assert_eq!(summary.results[0].status, ProfileStatus::NotFound);
    assert!(!profiles.lock_path("ghost").exists());
    assert_eq!(summary.results[1].status, ProfileStatus::Completed);
    assert_eq!(backend.keys(), vec!["a"]);
}

#[test]
fn empty_profile_completes_with_nothing_to_do() {
    let profiles = TestProfiles::new();
    profiles.write_profile("empty", &json!({}));
    let backend = RecordingBackend::new();

    let summary = profiles.controller(&backend).sync(&["empty"]);

    let result = &summary.results[0];
    assert_eq!(result.status, ProfileStatus::Completed);
    assert_eq!((result.completed, result.total), (0, 0));
    assert!(!result.is_failure());
    assert!(summary.is_success());
    profiles.assert_unlocked("empty");
}

#[test]
fn missing_destination_never_reaches_backend() {
    let profiles = TestProfiles::new();
    let (src, _) = profiles.endpoints("home", "a");
    let missing = profiles.root().join("nowhere").to_string_lossy().into_owned();
    profiles.add_record("home", "a", TaskRecord::new(src, missing.clone()).with_order(1));
    profiles.add_task("home", "b", 2);
    let backend = RecordingBackend::new();

    let summary = profiles.controller(&backend).sync(&["home"]);

    assert_eq!(backend.keys(), vec!["b"]);
    let result = &summary.results[0];
    assert_eq!((result.completed, result.total), (1, 2));
    assert_eq!(
        result.tasks[0].result.diagnostic.as_deref(),
        Some(format!("{} does not exist", missing).as_str())
    );
}

#[test]
fn unmounted_destination_never_reaches_backend() {
    let profiles = TestProfiles::new();
    let (src, dst) = profiles.endpoints("home", "a");
    let mut record = TaskRecord::new(src, dst.clone()).with_order(1);
    record.destination_must_be_mounted = true;
    profiles.add_record("home", "a", record);
    let backend = RecordingBackend::new();

    let summary = profiles.controller(&backend).sync(&["home"]);

    assert!(backend.invocations().is_empty());
    assert_eq!(
        summary.results[0].tasks[0].result.diagnostic.as_deref(),
        Some(format!("{} is not mounted", dst).as_str())
    );
}

#[test]
fn ignore_file_patterns_become_excludes() {
    let profiles = TestProfiles::new();
    let (src, dst) = profiles.endpoints("home", "a");
    std::fs::write(
        std::path::Path::new(&src).join(".jackupignore"),
        "# build output\ntarget\n\n*.swp\n",
    )
    .unwrap();
    let mut record = TaskRecord::new(src, dst).with_order(1);
    record.args = vec!["--delete".into()];
    record.excludes = vec!["*.swp".into()];
    profiles.add_record("home", "a", record);
    let backend = RecordingBackend::new();

    profiles.controller(&backend).sync(&["home"]);

    assert_eq!(
        backend.invocations()[0].options,
        vec!["--delete", "--exclude=*.swp", "--exclude=target"]
    );
}

#[test]
fn interrupt_stops_before_next_task_and_unlocks() {
    let profiles = TestProfiles::new();
    profiles.add_task("home", "a", 1);
    profiles.add_task("home", "b", 2);
    profiles.add_task("home", "c", 3);
    let interrupt = Interrupt::new();
    let trigger = interrupt.clone();
    let backend = RecordingBackend::new().on_transfer(move |_| trigger.request());

    let summary = profiles
        .controller(&backend)
        .with_interrupt(interrupt)
        .sync(&["home", "other"]);

    assert_eq!(backend.keys(), vec!["a"]);
    let result = &summary.results[0];
    assert_eq!(result.status, ProfileStatus::Interrupted);
    assert_eq!((result.completed, result.total), (1, 3));
    assert_eq!(result.final_state, RunState::Aborted);
    profiles.assert_unlocked("home");

    assert_eq!(summary.results[1].status, ProfileStatus::Cancelled);
}

#[test]
fn panicking_backend_still_unlocks() {
    let profiles = TestProfiles::new();
    profiles.add_task("home", "a", 1);
    let backend = RecordingBackend::new().panic_for("a");
    let controller = profiles.controller(&backend);

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        controller.sync(&["home"])
    }));

    assert!(outcome.is_err());
    profiles.assert_unlocked("home");
}

#[test]
fn unreadable_profile_fails_and_unlocks() {
    let profiles = TestProfiles::new();
    std::fs::write(profiles.store().profile_path("broken"), "{ not json").unwrap();
    let backend = RecordingBackend::new();

    let summary = profiles.controller(&backend).sync(&["broken"]);

    assert!(matches!(summary.results[0].status, ProfileStatus::Failed { .. }));
    assert!(summary.results[0].is_failure());
    profiles.assert_unlocked("broken");
}

#[test]
fn priority_alias_orders_like_order() {
    let profiles = TestProfiles::new();
    let (a_src, a_dst) = profiles.endpoints("legacy", "a");
    let (b_src, b_dst) = profiles.endpoints("legacy", "b");
    profiles.write_profile(
        "legacy",
        &json!({
            "a": { "source": a_src, "destination": a_dst, "priority": 5 },
            "b": { "source": b_src, "destination": b_dst, "priority": 2 },
        }),
    );
    let backend = RecordingBackend::new();

    profiles.controller(&backend).sync(&["legacy"]);

    assert_eq!(backend.keys(), vec!["b", "a"]);
}

#[test]
fn listing_takes_no_lock() {
    let profiles = TestProfiles::new();
    profiles.add_task("music", "flac", 1);
    profiles.add_task("music", "mp3", 2);
    profiles.add_task("photos", "raw", 1);
    let controller = profiles.controller(&RecordingBackend::new());

    assert_eq!(controller.list_profiles().unwrap(), vec!["music", "photos"]);
    assert_eq!(
        controller.profile_overview().unwrap(),
        vec![("music".to_string(), 2), ("photos".to_string(), 1)]
    );
    let names: Vec<_> = controller
        .tasks_in_run_order("music")
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["flac", "mp3"]);
    profiles.assert_unlocked("music");
    assert!(controller.tasks_in_run_order("ghost").is_err());
}

/// A store whose single profile lists the same task name twice.
struct RepeatedNames {
    tasks: Vec<Task>,
}

impl ProfileStore for RepeatedNames {
    fn exists(&self, name: &str) -> bool {
        name == "home"
    }

    fn load(&self, _name: &str) -> Result<Vec<Task>> {
        Ok(self.tasks.clone())
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(vec!["home".to_string()])
    }
}

#[test]
fn repeated_task_name_fails_before_any_transfer() {
    let profiles = TestProfiles::new();
    let (src, dst) = profiles.endpoints("home", "a");
    let (src_b, dst_b) = profiles.endpoints("home", "b");
    let store = RepeatedNames {
        tasks: vec![
            Task::new("a", &src, &dst, 1),
            Task::new("a", &src, &dst, 2),
            Task::new("b", src_b, dst_b, 3),
        ],
    };
    let backend = RecordingBackend::new();
    let executor = SyncExecutor::new(backend.boxed(), ".jackupignore").with_home(None);
    let controller = ProfileSyncController::new(Box::new(store), profiles.locks(), executor);

    let summary = controller.sync(&["home"]);

    let result = &summary.results[0];
    assert_eq!(
        result.status,
        ProfileStatus::Failed {
            reason: "Task a appears more than once in profile home".to_string()
        }
    );
    assert_eq!((result.completed, result.total), (0, 3));
    assert!(result.tasks.is_empty());
    assert_eq!(result.final_state, RunState::Done);
    assert!(backend.invocations().is_empty());
    assert!(!summary.is_success());
    profiles.assert_unlocked("home");
}

#[derive(Default)]
struct Events(Vec<String>);

impl SyncObserver for Events {
    fn profile_started(&mut self, profile: &str) {
        self.0.push(format!("start {profile}"));
    }

    fn profile_finished(&mut self, result: &ProfileResult) {
        self.0.push(format!("finish {} {}/{}", result.profile, result.completed, result.total));
    }
}

#[test]
fn observer_sees_each_profile_around_its_run() {
    let profiles = TestProfiles::new();
    profiles.add_task("home", "a", 1);
    profiles.add_task("work", "b", 1);
    let backend = RecordingBackend::new().exit_status_for("b", 12);
    let mut events = Events::default();

    let summary = profiles
        .controller(&backend)
        .sync_observed(&["home", "ghost", "work"], &mut events);

    assert_eq!(
        events.0,
        vec![
            "start home",
            "finish home 1/1",
            "start ghost",
            "finish ghost 0/0",
            "start work",
            "finish work 0/1",
        ]
    );
    let failed: Vec<_> = summary.failures().map(|r| r.profile.as_str()).collect();
    assert_eq!(failed, vec!["ghost", "work"]);
}
