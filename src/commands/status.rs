//! `vimpack status` — report the placement partition without mutating
//! anything.

use crate::commands::BatchContext;
use crate::core::resolver;
use crate::error::Result;
use crate::state::io::load_state;
use crate::ui;
use crate::utils::paths;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct StatusOptions {
    pub config: Option<PathBuf>,
}

pub fn run(options: &StatusOptions) -> Result<()> {
    let ctx = BatchContext::load(options.config.as_deref(), None)?;
    let resolved = resolver::resolve(&ctx.registry, &ctx.layout, &ctx.backends)?;
    let persisted = load_state(&paths::lockfile_path()?)?;

    ui::header("Plugins");
    for plugin in ctx.registry.iter() {
        let placement = if resolved.start.contains(&plugin.name) {
            "start"
        } else if resolved.opt.contains(&plugin.name) {
            "opt"
        } else if resolved.missing.contains(&plugin.name) {
            "missing"
        } else {
            // Present at the desired path but failing the integrity probe.
            "dirty"
        };

        let mut notes = vec![format!("{} [{}]", placement, plugin.backend)];
        if plugin.frozen {
            notes.push("frozen".to_string());
        }
        if let Some(record) = persisted.plugins.get(&plugin.name) {
            if let Some(rev) = &record.pinned_revision {
                notes.push(format!("pinned {}", short_rev(rev)));
            }
            if let Some(err) = &record.last_error {
                notes.push(format!("last error: {}", err));
            }
        }
        ui::keyval(&plugin.name, &notes.join(", "));
    }

    if !resolved.extra.is_empty() || !resolved.dirty.is_empty() {
        ui::header("Needs cleaning");
        for path in resolved.extra.iter() {
            ui::keyval("extra", &path.display().to_string());
        }
        for path in resolved.dirty.iter() {
            ui::keyval("dirty", &path.display().to_string());
        }
        ui::info("Run `vimpack clean` (or `vimpack sync`) to remove these");
    }

    if let Some(last_sync) = persisted.meta.last_sync {
        ui::separator();
        ui::info(&format!("Last sync: {}", last_sync.to_rfc3339()));
    }
    Ok(())
}

fn short_rev(rev: &str) -> &str {
    if rev.len() > 10 { &rev[..10] } else { rev }
}
