//! Error types for jackup-core

use std::path::PathBuf;

/// Result type for jackup-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in jackup-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Explicitly requested configuration file does not exist
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Profile has no backing storage entry
    #[error("Profile does not exist: {name}")]
    ProfileNotFound { name: String },

    /// Task name not present in the profile
    #[error("Task {task} not found in profile {profile}")]
    TaskNotFound { profile: String, task: String },

    /// Task name already taken within the profile
    #[error("Task {task} already exists in profile {profile}")]
    TaskExists { profile: String, task: String },

    /// Profile or task name unusable as a storage key
    #[error("Invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// Two tasks of one loaded profile share a name
    #[error("Task {task} appears more than once in profile {profile}")]
    DuplicateTask { profile: String, task: String },

    /// A task result was recorded twice in one run
    #[error("Result for task {task} was already recorded")]
    DuplicateRecord { task: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from jackup-fs
    #[error(transparent)]
    Fs(#[from] jackup_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
