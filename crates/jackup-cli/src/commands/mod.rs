//! Command implementations for jackup-cli

pub mod list;
pub mod sync;
pub mod task;
pub mod unlock;

pub use list::run_list;
pub use sync::run_sync;
pub use task::{NewTask, run_add, run_edit, run_remove};
pub use unlock::run_unlock;
