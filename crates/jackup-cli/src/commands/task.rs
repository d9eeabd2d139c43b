//! Task and profile editing: add, edit, remove

use colored::Colorize;
use jackup_core::{Task, TaskEdit, TaskRecord};

use crate::context::Context;
use crate::error::{CliError, Result};

/// Fields of a task given on the `add` command line.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub source: String,
    pub destination: String,
    pub order: Option<i64>,
    pub excludes: Vec<String>,
    pub args: Vec<String>,
    pub source_mounted: bool,
    pub destination_mounted: bool,
}

impl From<NewTask> for TaskRecord {
    fn from(new: NewTask) -> Self {
        TaskRecord {
            source: new.source,
            destination: new.destination,
            order: new.order,
            args: new.args,
            excludes: new.excludes,
            source_must_be_mounted: new.source_mounted,
            destination_must_be_mounted: new.destination_mounted,
        }
    }
}

/// Run the add command
pub fn run_add(ctx: &Context, profile: &str, task: &str, new: NewTask) -> Result<()> {
    ensure_unlocked(ctx, profile)?;
    let added = ctx.store().add_task(profile, task, new.into())?;
    println!(
        "{} Added {} to {}",
        "OK".green().bold(),
        describe(&added),
        profile.cyan()
    );
    Ok(())
}

/// Run the edit command
pub fn run_edit(ctx: &Context, profile: &str, task: &str, edit: TaskEdit) -> Result<()> {
    if edit.is_empty() {
        return Err(CliError::user(
            "Nothing to change. Pass --source, --destination or --order.",
        ));
    }
    ensure_unlocked(ctx, profile)?;
    let edited = ctx.store().edit_task(profile, task, edit)?;
    println!("{} Updated {}", "OK".green().bold(), describe(&edited));
    Ok(())
}

/// Run the remove command
///
/// Removes one task, or the whole profile when `task` is `None`.
pub fn run_remove(ctx: &Context, profile: &str, task: Option<&str>) -> Result<()> {
    ensure_unlocked(ctx, profile)?;
    let store = ctx.store();
    match task {
        Some(task) => {
            let removed = store.remove_task(profile, task)?;
            println!(
                "{} Removed task {} from {}",
                "OK".green().bold(),
                removed.name.cyan(),
                profile.cyan()
            );
        }
        None => {
            store.remove_profile(profile)?;
            println!("{} Removed profile {}", "OK".green().bold(), profile.cyan());
        }
    }
    Ok(())
}

/// Profiles are not edited while a sync holds their lock.
fn ensure_unlocked(ctx: &Context, profile: &str) -> Result<()> {
    if ctx.locks().is_locked(profile) {
        return Err(CliError::user(format!(
            "Profile {} is locked by a running sync. If none is running, use `jackup unlock {}`",
            profile, profile
        )));
    }
    Ok(())
}

fn describe(task: &Task) -> String {
    format!(
        "{} ({} -> {}, order {})",
        task.name.cyan(),
        task.source,
        task.destination,
        task.order
    )
}
