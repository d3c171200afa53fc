//! `vimpack clean` — remove undeclared and broken plugin directories.

use crate::commands::sync::pipeline::StageScope;
use crate::commands::sync::{self, SyncOptions};
use crate::error::Result;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    pub config: Option<PathBuf>,
    pub yes: bool,
}

pub fn run(options: &CleanOptions) -> Result<()> {
    let sync_options = SyncOptions {
        config: options.config.clone(),
        targets: None,
        jobs: None,
        yes: options.yes,
    };
    sync::run_scoped(&sync_options, StageScope::clean_only(), "Cleaning pack dirs")
}
