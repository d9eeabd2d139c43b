//! Profile synchronization orchestrator for jackup
//!
//! A profile is a named set of tasks, each mirroring one directory tree onto
//! another through an external tool. This crate provides:
//!
//! - **Profiles**: the task model and the JSON-backed profile store
//! - **Locking**: one sync run per profile at a time, released on every exit path
//! - **Sync**: ordering, per-task execution, result aggregation and the
//!   controller that ties them together
//! - **Configuration resolution**: locating and defaulting `jackup.conf`
//!
//! # Architecture
//!
//! ```text
//!                     jackup-cli
//!                         |
//!               ProfileSyncController
//!                         |
//!     +-----------+-------+-------+--------------+
//!     |           |               |              |
//! ProfileStore LockManager   SyncExecutor  ResultAggregator
//!                                 |
//!                            SyncBackend (rsync)
//!                         |
//!                     jackup-fs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use jackup_core::{ConfigResolver, ProfileSyncController, Result};
//!
//! fn example() -> Result<()> {
//!     let config = ConfigResolver::new().resolve()?;
//!     let controller = ProfileSyncController::from_config(&config);
//!     let summary = controller.sync(&["music"]);
//!     for result in &summary.results {
//!         println!("{}: {}/{}", result.profile, result.completed, result.total);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod interrupt;
pub mod lock;
pub mod profile;
pub mod sync;

pub use config::{CONFIG_ENV_VAR, Config, ConfigResolver};
pub use error::{Error, Result};
pub use interrupt::Interrupt;
pub use lock::{LockGuard, LockInfo, LockManager};
pub use profile::{JsonProfileStore, ProfileStore, Task, TaskEdit, TaskRecord, validate_name};
pub use sync::{
    BackendOutput, ProfileResult, ProfileStatus, ProfileSyncController, ResultAggregator,
    RsyncBackend, RunState, SyncBackend, SyncExecutor, SyncObserver, SyncResult, SyncSummary,
    SyncTier, TaskReport, order_tasks,
};
