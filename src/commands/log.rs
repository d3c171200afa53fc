//! `vimpack log` — change-log messages captured by the last update.

use crate::commands::BatchContext;
use crate::error::{Result, VimpackError};
use crate::state::io::load_state;
use crate::ui;
use crate::utils::paths;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub config: Option<PathBuf>,
    pub targets: Option<Vec<String>>,
}

pub fn run(options: &LogOptions) -> Result<()> {
    let ctx = BatchContext::load(options.config.as_deref(), None)?;
    let persisted = load_state(&paths::lockfile_path()?)?;

    let (names, unknown) = ctx.registry.filter_names(options.targets.as_deref());
    if let Some(first) = unknown.first() {
        return Err(VimpackError::TargetNotFound(first.clone()));
    }

    let mut shown = 0usize;
    for name in names {
        let Some(record) = persisted.plugins.get(&name) else {
            continue;
        };
        if record.last_messages.is_empty() {
            continue;
        }
        let range = record
            .last_revisions
            .as_ref()
            .map(|(before, after)| format!(" ({}..{})", short(before), short(after)))
            .unwrap_or_default();
        ui::header(&format!("{}{}", name, range));
        for message in &record.last_messages {
            println!("  {}", message);
        }
        shown += 1;
    }

    if shown == 0 {
        ui::info("No update history recorded; run `vimpack update` first");
    }
    Ok(())
}

fn short(rev: &str) -> &str {
    if rev.len() > 10 { &rev[..10] } else { rev }
}
