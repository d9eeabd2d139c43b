//! jackup CLI
//!
//! The command-line interface for syncing profiles of directory pairs.

mod cli;
mod commands;
mod context;
mod error;
mod logging;
mod output;
mod signal;

use std::path::Path;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use jackup_core::TaskEdit;

use cli::{Cli, Commands};
use context::Context;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: failed to initialise logging: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!(verbose = cli.verbose, "Logging enabled");

    match cli.command {
        Some(cmd) => execute_command(cmd, cli.config.as_deref()),
        None => {
            println!("{} profile sync", "jackup".green().bold());
            println!();
            println!("Run {} for available commands.", "jackup --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, config: Option<&Path>) -> Result<()> {
    match cmd {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "jackup", &mut std::io::stdout());
            Ok(())
        }
        Commands::List { profiles } => commands::run_list(&Context::load(config)?, &profiles),
        Commands::Sync { profiles, all } => {
            commands::run_sync(&Context::load(config)?, &profiles, all)
        }
        Commands::Add {
            profile,
            task,
            source,
            destination,
            order,
            excludes,
            args,
            source_mounted,
            destination_mounted,
        } => commands::run_add(
            &Context::load(config)?,
            &profile,
            &task,
            commands::NewTask {
                source,
                destination,
                order,
                excludes,
                args,
                source_mounted,
                destination_mounted,
            },
        ),
        Commands::Edit {
            profile,
            task,
            source,
            destination,
            order,
        } => commands::run_edit(
            &Context::load(config)?,
            &profile,
            &task,
            TaskEdit {
                source,
                destination,
                order,
            },
        ),
        Commands::Remove { profile, task } => {
            commands::run_remove(&Context::load(config)?, &profile, task.as_deref())
        }
        Commands::Unlock { profile } => commands::run_unlock(&Context::load(config)?, &profile),
    }
}
