//! Per-profile run supervision
//!
//! A profile run moves through [`RunState`]:
//!
//! ```text
//! Idle -> Locking -> Running -> Unlocking -> Done
//!   |        |                      |
//!   +--------+----------------------+-> Aborted
//! ```
//!
//! `Idle -> Aborted` covers a profile that does not exist or a run cancelled
//! before it started; `Locking -> Aborted` a lock that could not be taken;
//! `Unlocking -> Aborted` a run that was interrupted. Every path out of
//! `Running` goes through `Unlocking`, and the lock guard releases the lock
//! even if a backend panics.

use std::collections::HashSet;

use chrono::Local;
use tracing::{debug, error, info, warn};

use super::backend::RsyncBackend;
use super::executor::SyncExecutor;
use super::ordering::order_tasks;
use super::report::{ProfileResult, ProfileStatus, ResultAggregator, SyncSummary};
use crate::config::Config;
use crate::interrupt::Interrupt;
use crate::lock::LockManager;
use crate::profile::{JsonProfileStore, ProfileStore, Task};
use crate::{Error, Result};

/// Lifecycle of one profile run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Locking,
    Running,
    Unlocking,
    Done,
    Aborted,
}

impl RunState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (Idle, Locking)
                | (Idle, Aborted)
                | (Locking, Running)
                | (Locking, Aborted)
                | (Running, Unlocking)
                | (Unlocking, Done)
                | (Unlocking, Aborted)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Aborted)
    }
}

struct Transitions<'a> {
    profile: &'a str,
    state: RunState,
}

impl<'a> Transitions<'a> {
    fn new(profile: &'a str) -> Self {
        Self {
            profile,
            state: RunState::Idle,
        }
    }

    fn advance(&mut self, next: RunState) -> RunState {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        debug!(profile = self.profile, from = ?self.state, to = ?next, "Run state");
        self.state = next;
        next
    }
}

/// How the task loop ended.
enum RunEnd {
    Completed,
    Interrupted,
    Failed(Error),
}

/// What the task loop produced while the lock was held.
struct TaskRun {
    aggregator: ResultAggregator,
    end: RunEnd,
}

/// Hooks around each profile of a multi-profile sync.
pub trait SyncObserver {
    fn profile_started(&mut self, _profile: &str) {}

    fn profile_finished(&mut self, _result: &ProfileResult) {}
}

impl SyncObserver for () {}

/// Drives profile runs: lock, order, execute, record, unlock.
pub struct ProfileSyncController {
    store: Box<dyn ProfileStore>,
    locks: LockManager,
    executor: SyncExecutor,
    interrupt: Interrupt,
}

impl ProfileSyncController {
    pub fn new(store: Box<dyn ProfileStore>, locks: LockManager, executor: SyncExecutor) -> Self {
        Self {
            store,
            locks,
            executor,
            interrupt: Interrupt::new(),
        }
    }

    /// Wire up the JSON store, lock directory and rsync backend described by
    /// `config`.
    pub fn from_config(config: &Config) -> Self {
        let store = JsonProfileStore::for_config(config);
        let locks = LockManager::new(&config.dir);
        let executor = SyncExecutor::new(
            Box::new(RsyncBackend::from_config(config)),
            config.ignore_file.clone(),
        );
        Self::new(Box::new(store), locks, executor)
    }

    /// Observe `interrupt` between tasks instead of a private flag.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    pub fn locks(&self) -> &LockManager {
        &self.locks
    }

    /// Sync each profile in turn. One profile's outcome never prevents the
    /// next from being attempted.
    pub fn sync<S: AsRef<str>>(&self, profiles: &[S]) -> SyncSummary {
        self.sync_observed(profiles, &mut ())
    }

    /// [`sync`](Self::sync), reporting each profile to `observer` as it
    /// starts and finishes.
    pub fn sync_observed<S: AsRef<str>>(
        &self,
        profiles: &[S],
        observer: &mut dyn SyncObserver,
    ) -> SyncSummary {
        let results = profiles
            .iter()
            .map(|name| {
                let name = name.as_ref();
                observer.profile_started(name);
                let result = self.sync_profile(name);
                observer.profile_finished(&result);
                result
            })
            .collect();
        SyncSummary { results }
    }

    /// Run every task of one profile under its lock.
    pub fn sync_profile(&self, profile: &str) -> ProfileResult {
        let started_at = Local::now();
        let mut state = Transitions::new(profile);

        if self.interrupt.is_requested() {
            state.advance(RunState::Aborted);
            return ProfileResult::not_run(profile, ProfileStatus::Cancelled, started_at);
        }

        if !self.store.exists(profile) {
            warn!(profile, "Profile does not exist");
            state.advance(RunState::Aborted);
            return ProfileResult::not_run(profile, ProfileStatus::NotFound, started_at);
        }

        state.advance(RunState::Locking);
        let guard = match self.locks.try_lock(profile) {
            Ok(Some(guard)) => guard,
            Ok(None) => {
                let holder = self.locks.holder(profile);
                warn!(profile, holder = ?holder, "Sync already running");
                state.advance(RunState::Aborted);
                return ProfileResult::not_run(
                    profile,
                    ProfileStatus::AlreadyRunning { holder },
                    started_at,
                );
            }
            Err(e) => {
                error!(profile, error = %e, "Failed to lock profile");
                state.advance(RunState::Aborted);
                return ProfileResult::not_run(
                    profile,
                    ProfileStatus::Failed {
                        reason: e.to_string(),
                    },
                    started_at,
                );
            }
        };

        state.advance(RunState::Running);
        let run = self.run_tasks(profile);

        state.advance(RunState::Unlocking);
        if let Err(e) = guard.release() {
            warn!(profile, error = %e, "Failed to release lock");
        }

        let (status, aggregator) = match run {
            Ok(TaskRun { aggregator, end }) => {
                let status = match end {
                    RunEnd::Completed => ProfileStatus::Completed,
                    RunEnd::Interrupted => ProfileStatus::Interrupted,
                    RunEnd::Failed(e) => {
                        error!(profile, error = %e, "Profile run failed");
                        ProfileStatus::Failed {
                            reason: e.to_string(),
                        }
                    }
                };
                (status, Some(aggregator))
            }
            Err(e) => {
                error!(profile, error = %e, "Profile run failed");
                (
                    ProfileStatus::Failed {
                        reason: e.to_string(),
                    },
                    None,
                )
            }
        };

        let final_state = state.advance(if status == ProfileStatus::Interrupted {
            RunState::Aborted
        } else {
            RunState::Done
        });

        let (completed, total, tasks) = match aggregator {
            Some(aggregator) => (
                aggregator.completed(),
                aggregator.total(),
                aggregator.into_reports(),
            ),
            None => (0, 0, Vec::new()),
        };
        info!(profile, completed, total, "Profile finished");

        ProfileResult {
            profile: profile.to_string(),
            completed,
            total,
            status,
            tasks,
            started_at,
            finished_at: Local::now(),
            final_state,
        }
    }

    /// Execute the profile's tasks in order. `Err` means nothing was
    /// scheduled; later failures keep the aggregator and its planned total.
    fn run_tasks(&self, profile: &str) -> Result<TaskRun> {
        let tasks = order_tasks(self.store.load(profile)?);
        let mut aggregator = ResultAggregator::new(profile, tasks.len());

        if let Some(task) = first_duplicate(&tasks) {
            return Ok(TaskRun {
                aggregator,
                end: RunEnd::Failed(Error::DuplicateTask {
                    profile: profile.to_string(),
                    task: task.to_string(),
                }),
            });
        }

        for task in &tasks {
            if self.interrupt.is_requested() {
                warn!(profile, remaining = tasks.len() - aggregator.recorded(), "Interrupted");
                return Ok(TaskRun {
                    aggregator,
                    end: RunEnd::Interrupted,
                });
            }
            let result = self.executor.execute(task);
            if result.succeeded {
                info!(profile, task = %task.name, "Task succeeded");
            } else {
                warn!(profile, task = %task.name, diagnostic = ?result.diagnostic, "Task failed");
            }
            if let Err(e) = aggregator.record(&task.name, result) {
                return Ok(TaskRun {
                    aggregator,
                    end: RunEnd::Failed(e),
                });
            }
        }

        Ok(TaskRun {
            aggregator,
            end: RunEnd::Completed,
        })
    }

    /// Names of all stored profiles. Takes no lock.
    pub fn list_profiles(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// Every profile with its task count.
    pub fn profile_overview(&self) -> Result<Vec<(String, usize)>> {
        self.store
            .list()?
            .into_iter()
            .map(|name| {
                let count = self.store.load(&name)?.len();
                Ok((name, count))
            })
            .collect()
    }

    /// A profile's tasks in the order a sync would run them.
    pub fn tasks_in_run_order(&self, profile: &str) -> Result<Vec<Task>> {
        if !self.store.exists(profile) {
            return Err(crate::Error::ProfileNotFound {
                name: profile.to_string(),
            });
        }
        Ok(order_tasks(self.store.load(profile)?))
    }
}

fn first_duplicate(tasks: &[Task]) -> Option<&str> {
    let mut seen = HashSet::new();
    tasks
        .iter()
        .map(|t| t.name.as_str())
        .find(|name| !seen.insert(*name))
}
