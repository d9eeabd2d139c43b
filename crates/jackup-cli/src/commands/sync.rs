//! The sync command

use colored::Colorize;
use jackup_core::{ProfileResult, ProfileStatus, SyncObserver};

use crate::context::Context;
use crate::error::{CliError, Result};
use crate::output::{Cell, Table, format_elapsed, outcome_cell};
use crate::signal;

/// Run the sync command
///
/// Profiles are synced one after another. The command fails if any profile
/// did not run or had a failing task.
pub fn run_sync(ctx: &Context, profiles: &[String], all: bool) -> Result<()> {
    let controller = ctx.controller();
    let profiles = if all {
        controller.list_profiles()?
    } else {
        profiles.to_vec()
    };
    if profiles.is_empty() {
        println!("No profiles to sync.");
        return Ok(());
    }

    signal::forward_ctrl_c(controller.interrupt().clone())?;

    let summary = controller.sync_observed(&profiles, &mut Printer);

    if summary.results.len() > 1 {
        println!();
        let mut table = Table::new(&["profile", "result", "time"]);
        for result in &summary.results {
            table.add_row(vec![
                Cell::from(result.profile.as_str()),
                outcome_cell(result),
                Cell::from(format_elapsed(result.elapsed())),
            ]);
        }
        print!("{}", table.render());
    }

    if !summary.is_success() {
        return Err(CliError::user(format!(
            "{} of {} profile(s) did not sync completely",
            summary.failures().count(),
            summary.results.len()
        )));
    }
    Ok(())
}

/// Prints each profile's header before it runs and its outcome after.
struct Printer;

impl SyncObserver for Printer {
    fn profile_started(&mut self, profile: &str) {
        println!("{} Syncing {}", "=>".blue().bold(), profile.cyan());
    }

    fn profile_finished(&mut self, result: &ProfileResult) {
        print_profile(result);
    }
}

fn print_profile(result: &ProfileResult) {
    for report in &result.tasks {
        if report.result.succeeded {
            println!("   {} {}", "OK".green().bold(), report.task);
        } else {
            println!("   {} {}", "FAILED".red().bold(), report.task);
            if let Some(ref diagnostic) = report.result.diagnostic {
                for line in diagnostic.lines() {
                    println!("      {}", line.dimmed());
                }
            }
        }
    }

    match result.status {
        ProfileStatus::AlreadyRunning { ref holder } => {
            let since = holder
                .as_ref()
                .map(|h| format!(" (pid {} since {})", h.pid, h.acquired_at.format("%Y-%m-%d %H:%M:%S")))
                .unwrap_or_default();
            println!(
                "   {} sync already running for {}{}",
                "SKIPPED".red().bold(),
                result.profile,
                since
            );
            println!(
                "   If no sync is running, remove the lock with {}",
                format!("jackup unlock {}", result.profile).cyan()
            );
        }
        ProfileStatus::NotFound => {
            println!("   {} profile {} does not exist", "SKIPPED".red().bold(), result.profile);
        }
        ProfileStatus::Cancelled => {
            println!("   {} interrupted before start", "SKIPPED".red().bold());
        }
        ProfileStatus::Failed { ref reason } => {
            println!("   {} {}", "FAILED".red().bold(), reason);
        }
        ProfileStatus::Interrupted | ProfileStatus::Completed => {
            let cell = outcome_cell(result);
            println!(
                "   {} tasks synced in {}",
                cell.render(),
                format_elapsed(result.elapsed())
            );
        }
    }
}
