//! Command implementations behind the CLI dispatcher.

pub mod clean;
pub mod install;
pub mod lock;
pub mod log;
pub mod restore;
pub mod status;
pub mod sync;
pub mod update;

use crate::backends::{self, BackendSet};
use crate::config::loader;
use crate::config::types::Settings;
use crate::core::registry::PluginRegistry;
use crate::core::resolver;
use crate::core::types::PackLayout;
use crate::editor::HookRunner;
use crate::error::Result;
use crate::state::io::{load_state, save_state};
use crate::state::types::PluginState;
use crate::utils::paths;
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::Path;

/// Everything a command needs after configuration is loaded.
pub struct BatchContext {
    pub settings: Settings,
    pub registry: PluginRegistry,
    pub layout: PackLayout,
    pub backends: BackendSet,
    pub hooks: HookRunner,
}

impl BatchContext {
    pub fn load(config: Option<&Path>, jobs_override: Option<usize>) -> Result<Self> {
        let config_path = loader::resolve_config_path(config)?;
        let (mut settings, registry) = loader::load(&config_path)?;
        if let Some(jobs) = jobs_override {
            settings.jobs = jobs;
        }
        let layout = PackLayout::new(&settings.pack_dir);
        let backends = backends::default_set(settings.depth);
        let hooks = HookRunner::from_editor_setting(settings.editor.as_deref());
        Ok(Self {
            settings,
            registry,
            layout,
            backends,
            hooks,
        })
    }
}

/// Rewrite the persisted state from the post-batch registry and a fresh
/// filesystem scan. Records for plugins no longer declared are dropped;
/// pinned revisions survive across batches.
pub(crate) fn persist_state(ctx: &BatchContext) -> Result<()> {
    let path = paths::lockfile_path()?;
    let mut previous = load_state(&path)?;
    let resolved = resolver::resolve(&ctx.registry, &ctx.layout, &ctx.backends)?;

    let mut plugins = BTreeMap::new();
    for plugin in ctx.registry.iter() {
        let mut record = previous
            .plugins
            .remove(&plugin.name)
            .unwrap_or_else(|| PluginState::new(plugin.backend, plugin.placement));
        record.backend = plugin.backend;
        record.placement = plugin.placement;
        record.installed = resolved.is_installed(&plugin.name);
        record.last_error = plugin.runtime.last_error.clone();
        if let Some(revisions) = &plugin.runtime.revisions {
            record.last_revisions = Some(revisions.clone());
            record.last_messages = plugin.runtime.messages.clone();
        }
        record.touched_at = Utc::now();
        plugins.insert(plugin.name.clone(), record);
    }

    previous.plugins = plugins;
    previous.meta.last_sync = Some(Utc::now());
    save_state(&path, &previous)
}
