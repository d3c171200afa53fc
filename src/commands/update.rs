//! `vimpack update` — update installed, unfrozen plugins.

use crate::commands::sync::pipeline::StageScope;
use crate::commands::sync::{self, SyncOptions};
use crate::error::Result;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub config: Option<PathBuf>,
    pub targets: Option<Vec<String>>,
    pub jobs: Option<usize>,
    pub yes: bool,
}

pub fn run(options: &UpdateOptions) -> Result<()> {
    let sync_options = SyncOptions {
        config: options.config.clone(),
        targets: options.targets.clone(),
        jobs: options.jobs,
        yes: options.yes,
    };
    sync::run_scoped(&sync_options, StageScope::update_only(), "Updating plugins")
}
