use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "vimpack",
    about = "Declarative Vim/Neovim plugin manager",
    long_about = "Reconciles the native pack directory layout (start/opt) against a \
declarative plugin configuration",
    version,
    next_line_help = false,
    term_width = 80
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Parser, Debug)]
pub struct GlobalFlags {
    /// Config file (default: XDG config dir/vimpack/plugins.kdl)
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip confirmation prompts
    #[arg(short = 'y', long = "yes", global = true)]
    pub yes: bool,

    /// Concurrency limit for install/update (0 = one worker per plugin)
    #[arg(short = 'j', long, global = true, value_name = "N")]
    pub jobs: Option<usize>,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Quiet mode
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Full reconciliation: move, clean, install, update, helptags
    Sync {
        /// Restrict install/update to these plugins
        #[arg(value_name = "PLUGIN")]
        targets: Vec<String>,
    },

    /// Install missing plugins only
    Install {
        /// Restrict to these plugins
        #[arg(value_name = "PLUGIN")]
        targets: Vec<String>,
    },

    /// Update installed, unfrozen plugins
    Update {
        /// Restrict to these plugins
        #[arg(value_name = "PLUGIN")]
        targets: Vec<String>,
    },

    /// Remove undeclared and broken plugin directories
    Clean,

    /// Show the placement state of every declared plugin
    Status,

    /// Show change-log messages from the last update
    Log {
        /// Restrict to these plugins
        #[arg(value_name = "PLUGIN")]
        targets: Vec<String>,
    },

    /// Pin installed plugins to their current revisions
    Lock {
        /// Restrict to these plugins
        #[arg(value_name = "PLUGIN")]
        targets: Vec<String>,
    },

    /// Check pinned revisions back out
    Restore {
        /// Restrict to these plugins
        #[arg(value_name = "PLUGIN")]
        targets: Vec<String>,
    },
}

/// Empty target list on the command line means "all declared plugins".
pub fn targets_or_all(targets: &[String]) -> Option<Vec<String>> {
    if targets.is_empty() {
        None
    } else {
        Some(targets.to_vec())
    }
}
