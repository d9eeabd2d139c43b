//! Profiles: named, persisted collections of tasks
//!
//! The orchestrator only needs the narrow [`ProfileStore`] contract.
//! [`JsonProfileStore`] is the on-disk implementation used by the CLI, which
//! also carries the editing operations behind `jackup add/edit/remove`.

mod store;
mod task;

pub use store::{JsonProfileStore, TaskEdit};
pub use task::{Task, TaskRecord};

use crate::{Error, Result};

/// Keyed storage mapping a profile name to its tasks.
pub trait ProfileStore {
    /// Whether a profile with this name has a storage entry.
    fn exists(&self, name: &str) -> bool;

    /// Load the tasks of a profile, in the storage's natural order.
    fn load(&self, name: &str) -> Result<Vec<Task>>;

    /// Names of all stored profiles.
    fn list(&self) -> Result<Vec<String>>;
}

/// Check that a profile or task name can be used as a storage key.
pub fn validate_name(name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("name must not be empty")
    } else if name.contains(['/', '\\']) {
        Some("name must not contain path separators")
    } else if name.starts_with('.') {
        Some("name must not start with '.'")
    } else if name.chars().any(char::is_control) {
        Some("name must not contain control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
