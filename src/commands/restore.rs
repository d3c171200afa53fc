//! `vimpack restore` — check installed plugins out at their pinned
//! revisions.

use crate::commands::BatchContext;
use crate::core::resolver;
use crate::error::{Result, VimpackError};
use crate::state::io::{BatchLock, load_state};
use crate::ui;
use crate::utils::paths;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct RestoreOptions {
    pub config: Option<PathBuf>,
    pub targets: Option<Vec<String>>,
}

pub fn run(options: &RestoreOptions) -> Result<()> {
    let ctx = BatchContext::load(options.config.as_deref(), None)?;
    let resolved = resolver::resolve(&ctx.registry, &ctx.layout, &ctx.backends)?;
    let persisted = load_state(&paths::lockfile_path()?)?;

    let (names, unknown) = ctx.registry.filter_names(options.targets.as_deref());
    if let Some(first) = unknown.first() {
        return Err(VimpackError::TargetNotFound(first.clone()));
    }

    let _lock = BatchLock::acquire(&ctx.settings.pack_dir)?;

    ui::header("Restoring pinned revisions");
    let mut restored = 0usize;
    let mut failed = 0usize;

    for name in names {
        let Some(plugin) = ctx.registry.get(&name) else {
            continue;
        };
        let Some(revision) = persisted
            .plugins
            .get(&name)
            .and_then(|record| record.pinned_revision.clone())
        else {
            ui::verbose(&format!("'{}' has no pinned revision; skipping", name));
            continue;
        };
        if !resolved.is_installed(&name) {
            ui::warning(&format!("'{}' is not installed; run `vimpack sync` first", name));
            continue;
        }

        let backend = ctx.backends.get(plugin.backend)?;
        let dir = ctx.layout.dir_for(plugin);
        match backend.checkout(&dir, &revision) {
            Ok(()) => {
                ui::keyval(&name, &revision);
                restored += 1;
            }
            Err(e) => {
                ui::error(&format!("Could not restore '{}': {}", name, e));
                failed += 1;
            }
        }
    }

    ui::success(&format!("Restored {} plugin(s)", restored));
    if failed > 0 {
        return Err(VimpackError::Other(format!(
            "{} plugin(s) could not be restored",
            failed
        )));
    }
    Ok(())
}
