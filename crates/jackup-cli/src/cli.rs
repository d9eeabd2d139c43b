//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

/// jackup - Sync profiles of directory pairs with rsync
#[derive(Parser, Debug)]
#[command(name = "jackup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Use this config file instead of searching for one
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List profiles, or the tasks of the given profiles
    ///
    /// Examples:
    ///   jackup list              # Every profile with its task count
    ///   jackup list music        # Tasks of 'music' in run order
    List {
        /// Profiles to show in detail
        profiles: Vec<String>,
    },

    /// Synchronize profiles
    ///
    /// Each task of a profile runs once, lowest order first. A profile that
    /// is already being synced elsewhere is skipped.
    Sync {
        /// Profiles to synchronize
        #[arg(required_unless_present = "all")]
        profiles: Vec<String>,

        /// Synchronize every profile
        #[arg(long, conflicts_with = "profiles")]
        all: bool,
    },

    /// Add a task to a profile, creating the profile if needed
    ///
    /// Examples:
    ///   jackup add music flac ~/Music/flac/ /mnt/usb/flac
    ///   jackup add music mp3 ~/Music/mp3/ nas:/backup/mp3 --order 5 --exclude '*.tmp'
    Add {
        /// Profile name
        profile: String,
        /// Task name, unique within the profile
        task: String,
        /// Path to sync from
        source: String,
        /// Path to sync to
        destination: String,

        /// Run position; defaults to after every existing task
        #[arg(short, long, alias = "priority", allow_negative_numbers = true)]
        order: Option<i64>,

        /// Pattern to exclude from the transfer (repeatable)
        #[arg(short, long = "exclude", value_name = "PATTERN")]
        excludes: Vec<String>,

        /// Extra option passed to rsync verbatim (repeatable)
        #[arg(long = "arg", value_name = "OPTION", allow_hyphen_values = true)]
        args: Vec<String>,

        /// Refuse to sync unless the source is a mount point
        #[arg(long)]
        source_mounted: bool,

        /// Refuse to sync unless the destination is a mount point
        #[arg(long)]
        destination_mounted: bool,
    },

    /// Change a task's source, destination or order
    Edit {
        /// Profile name
        profile: String,
        /// Task name
        task: String,

        /// New source path
        #[arg(long)]
        source: Option<String>,

        /// New destination path
        #[arg(long)]
        destination: Option<String>,

        /// New run position
        #[arg(short, long, alias = "priority", allow_negative_numbers = true)]
        order: Option<i64>,
    },

    /// Remove a task, or a whole profile when no task is given
    Remove {
        /// Profile name
        profile: String,
        /// Task name
        task: Option<String>,
    },

    /// Remove a profile's lock left behind by an aborted run
    Unlock {
        /// Profile name
        profile: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
