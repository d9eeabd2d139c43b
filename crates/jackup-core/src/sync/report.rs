//! Per-task outcomes collected into per-profile results

use std::collections::HashSet;

use chrono::{DateTime, Local, TimeDelta};

use super::controller::RunState;
use super::executor::SyncResult;
use crate::lock::LockInfo;
use crate::{Error, Result};

/// One task's outcome within a profile run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub task: String,
    pub result: SyncResult,
}

/// Collects task results for a single profile run.
#[derive(Debug)]
pub struct ResultAggregator {
    profile: String,
    scheduled: usize,
    reports: Vec<TaskReport>,
    seen: HashSet<String>,
}

impl ResultAggregator {
    /// Start a run of `scheduled` tasks for `profile`.
    pub fn new(profile: impl Into<String>, scheduled: usize) -> Self {
        Self {
            profile: profile.into(),
            scheduled,
            reports: Vec::with_capacity(scheduled),
            seen: HashSet::new(),
        }
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Record the result of `task`. Each task may be recorded once.
    pub fn record(&mut self, task: &str, result: SyncResult) -> Result<()> {
        if !self.seen.insert(task.to_string()) {
            return Err(Error::DuplicateRecord {
                task: task.to_string(),
            });
        }
        self.reports.push(TaskReport {
            task: task.to_string(),
            result,
        });
        Ok(())
    }

    /// Number of recorded tasks that succeeded.
    pub fn completed(&self) -> usize {
        self.reports.iter().filter(|r| r.result.succeeded).count()
    }

    /// Number of tasks the run was planned with.
    pub fn total(&self) -> usize {
        self.scheduled
    }

    /// Number of results recorded so far.
    pub fn recorded(&self) -> usize {
        self.reports.len()
    }

    pub fn into_reports(self) -> Vec<TaskReport> {
        self.reports
    }
}

/// How a profile's run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileStatus {
    /// Every scheduled task was attempted
    Completed,
    /// Stopped early on user interrupt; the lock was released
    Interrupted,
    /// Another run holds the lock; nothing was attempted
    AlreadyRunning { holder: Option<LockInfo> },
    /// No storage entry for the profile
    NotFound,
    /// The run could not proceed (lock or storage error)
    Failed { reason: String },
    /// Interrupt requested before this profile started
    Cancelled,
}

impl ProfileStatus {
    /// Whether any task was attempted.
    pub fn ran(&self) -> bool {
        matches!(self, Self::Completed | Self::Interrupted)
    }
}

/// Traffic-light rating of a finished profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTier {
    /// All tasks succeeded
    Full,
    /// Some tasks succeeded
    Partial,
    /// No task succeeded
    Failed,
}

/// Outcome of one profile within a sync invocation.
#[derive(Debug, Clone)]
pub struct ProfileResult {
    pub profile: String,
    /// Tasks that succeeded
    pub completed: usize,
    /// Tasks scheduled
    pub total: usize,
    pub status: ProfileStatus,
    pub tasks: Vec<TaskReport>,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    /// State the controller ended in, `Done` or `Aborted`
    pub final_state: RunState,
}

impl ProfileResult {
    /// A result for a profile that never reached its task loop.
    pub fn not_run(profile: impl Into<String>, status: ProfileStatus, started_at: DateTime<Local>) -> Self {
        Self {
            profile: profile.into(),
            completed: 0,
            total: 0,
            status,
            tasks: Vec::new(),
            started_at,
            finished_at: Local::now(),
            final_state: RunState::Aborted,
        }
    }

    pub fn tier(&self) -> SyncTier {
        if self.total > 0 && self.completed == self.total {
            SyncTier::Full
        } else if self.completed > 0 {
            SyncTier::Partial
        } else {
            SyncTier::Failed
        }
    }

    pub fn elapsed(&self) -> TimeDelta {
        self.finished_at - self.started_at
    }

    /// Anything short of a run in which every scheduled task succeeded.
    ///
    /// A profile with no tasks that ran to completion is not a failure.
    pub fn is_failure(&self) -> bool {
        !self.status.ran() || self.completed < self.total
    }

    pub fn failed_tasks(&self) -> impl Iterator<Item = &TaskReport> {
        self.tasks.iter().filter(|r| !r.result.succeeded)
    }
}

/// Results of one sync invocation, in the order profiles were requested.
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    pub results: Vec<ProfileResult>,
}

impl SyncSummary {
    pub fn failures(&self) -> impl Iterator<Item = &ProfileResult> {
        self.results.iter().filter(|r| r.is_failure())
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}
