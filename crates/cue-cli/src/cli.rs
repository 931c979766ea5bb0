//! CLI argument and command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cue", version, about = "Trigger-driven generation menu for outline notes")]
pub struct Cli {
    /// Settings file (defaults to ~/.cue/config.json).
    #[arg(long, global = true, env = "CUE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the trigger token for this run.
    #[arg(long, global = true)]
    pub trigger: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Edit an outline in the terminal (default).
    Edit {
        /// Outline file to open; written back on exit.
        outline: Option<PathBuf>,

        /// Page title when no file is given.
        #[arg(long, default_value = "Scratch")]
        title: String,
    },

    /// Run one menu option against a block of an outline file.
    Run {
        /// Outline file.
        outline: PathBuf,

        /// Option id (see `cue options`).
        #[arg(short, long, default_value = "completion_default")]
        option: String,

        /// 1-based line of the target block (defaults to the last line).
        #[arg(short, long)]
        line: Option<usize>,

        /// Model name (defaults to the first model for the option's output kind).
        #[arg(short, long)]
        model: Option<String>,

        /// Print the request instead of sending it.
        #[arg(long)]
        dry_run: bool,

        /// Write the updated outline back to the file.
        #[arg(short, long)]
        write: bool,
    },

    /// List menu options and models.
    Options,

    /// Show or change settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the current settings.
    Show,
    /// Set one value; invalid input leaves the setting unchanged.
    Set {
        /// Setting name.
        key: String,
        /// Raw value.
        value: String,
    },
    /// Print the settings file location.
    Path,
}
