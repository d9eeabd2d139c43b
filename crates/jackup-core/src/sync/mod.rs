//! Profile synchronization
//!
//! - **ordering**: deterministic run order of a profile's tasks
//! - **backend**: the external transfer tool contract and the rsync driver
//! - **executor**: precondition checks and one backend call per task
//! - **report**: per-task results, per-profile summaries
//! - **controller**: the lock / run / unlock state machine over profiles

mod backend;
mod controller;
mod executor;
mod ordering;
mod report;

pub use backend::{BackendOutput, RsyncBackend, SyncBackend};
pub use controller::{ProfileSyncController, RunState, SyncObserver};
pub use executor::{SyncExecutor, SyncResult};
pub use ordering::order_tasks;
pub use report::{ProfileResult, ProfileStatus, ResultAggregator, SyncSummary, SyncTier, TaskReport};
