//! Filesystem layer for jackup
//!
//! Provides path resolution for sync endpoints, atomic file I/O, config file
//! loading, mount-point probing and ignore-file lookup.

pub mod config;
pub mod error;
pub mod ignore;
pub mod io;
pub mod mount;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use ignore::{DEFAULT_IGNORE_FILE, read_ignore_file};
pub use mount::is_mount_point;
pub use path::{PathKind, SyncPath};
