//! `vimpack lock` — pin installed plugins to their current revisions.

use crate::commands::BatchContext;
use crate::core::resolver;
use crate::error::{Result, VimpackError};
use crate::state::io::{load_state, save_state};
use crate::state::types::PluginState;
use crate::ui;
use crate::utils::paths;
use chrono::Utc;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct LockOptions {
    pub config: Option<PathBuf>,
    pub targets: Option<Vec<String>>,
}

pub fn run(options: &LockOptions) -> Result<()> {
    let ctx = BatchContext::load(options.config.as_deref(), None)?;
    let resolved = resolver::resolve(&ctx.registry, &ctx.layout, &ctx.backends)?;

    let (names, unknown) = ctx.registry.filter_names(options.targets.as_deref());
    if let Some(first) = unknown.first() {
        return Err(VimpackError::TargetNotFound(first.clone()));
    }

    let path = paths::lockfile_path()?;
    let mut state = load_state(&path)?;
    let mut pinned = 0usize;

    ui::header("Pinning revisions");
    for name in names {
        let Some(plugin) = ctx.registry.get(&name) else {
            continue;
        };
        if !resolved.is_installed(&name) {
            ui::warning(&format!("'{}' is not installed; skipping", name));
            continue;
        }
        let backend = ctx.backends.get(plugin.backend)?;
        let dir = ctx.layout.dir_for(plugin);
        match backend.head_revision(&dir) {
            Ok(revision) => {
                let record = state
                    .plugins
                    .entry(name.clone())
                    .or_insert_with(|| PluginState::new(plugin.backend, plugin.placement));
                record.pinned_revision = Some(revision.clone());
                record.installed = true;
                record.touched_at = Utc::now();
                ui::keyval(&name, &revision);
                pinned += 1;
            }
            Err(e) => ui::warning(&format!("Could not read revision of '{}': {}", name, e)),
        }
    }

    save_state(&path, &state)?;
    ui::success(&format!("Pinned {} plugin(s)", pinned));
    Ok(())
}
