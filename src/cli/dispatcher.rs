//! Routes parsed CLI commands to their handlers.

use crate::cli::args::{Cli, Command, targets_or_all};
use crate::commands;
use crate::error::Result;

pub fn dispatch(args: &Cli) -> Result<()> {
    match &args.command {
        Command::Sync { targets } => commands::sync::run(&commands::sync::SyncOptions {
            config: args.global.config.clone(),
            targets: targets_or_all(targets),
            jobs: args.global.jobs,
            yes: args.global.yes,
        }),

        Command::Install { targets } => {
            commands::install::run(&commands::install::InstallOptions {
                config: args.global.config.clone(),
                targets: targets_or_all(targets),
                jobs: args.global.jobs,
                yes: args.global.yes,
            })
        }

        Command::Update { targets } => commands::update::run(&commands::update::UpdateOptions {
            config: args.global.config.clone(),
            targets: targets_or_all(targets),
            jobs: args.global.jobs,
            yes: args.global.yes,
        }),

        Command::Clean => commands::clean::run(&commands::clean::CleanOptions {
            config: args.global.config.clone(),
            yes: args.global.yes,
        }),

        Command::Status => commands::status::run(&commands::status::StatusOptions {
            config: args.global.config.clone(),
        }),

        Command::Log { targets } => commands::log::run(&commands::log::LogOptions {
            config: args.global.config.clone(),
            targets: targets_or_all(targets),
        }),

        Command::Lock { targets } => commands::lock::run(&commands::lock::LockOptions {
            config: args.global.config.clone(),
            targets: targets_or_all(targets),
        }),

        Command::Restore { targets } => {
            commands::restore::run(&commands::restore::RestoreOptions {
                config: args.global.config.clone(),
                targets: targets_or_all(targets),
            })
        }
    }
}
