//! `vimpack install` — install missing plugins without touching the rest.

use crate::commands::sync::pipeline::StageScope;
use crate::commands::sync::{self, SyncOptions};
use crate::error::Result;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    pub config: Option<PathBuf>,
    pub targets: Option<Vec<String>>,
    pub jobs: Option<usize>,
    pub yes: bool,
}

pub fn run(options: &InstallOptions) -> Result<()> {
    let sync_options = SyncOptions {
        config: options.config.clone(),
        targets: options.targets.clone(),
        jobs: options.jobs,
        yes: options.yes,
    };
    sync::run_scoped(
        &sync_options,
        StageScope::install_only(),
        "Installing plugins",
    )
}
