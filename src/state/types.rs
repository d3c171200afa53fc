use crate::core::types::{BackendKind, Placement};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CURRENT_STATE_SCHEMA_VERSION: u8 = 1;

/// Per-plugin record persisted between batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginState {
    pub backend: BackendKind,
    pub placement: Placement,
    /// Derived from post-stage directory existence, not the backend's
    /// own success signal.
    pub installed: bool,
    /// Revision pinned by `vimpack lock`; `restore` checks this out.
    pub pinned_revision: Option<String>,
    /// Before/after pair from the last actual update.
    pub last_revisions: Option<(String, String)>,
    /// Change-log messages from the last actual update (`vimpack log`).
    pub last_messages: Vec<String>,
    pub last_error: Option<String>,
    pub touched_at: DateTime<Utc>,
}

impl PluginState {
    pub fn new(backend: BackendKind, placement: Placement) -> Self {
        Self {
            backend,
            placement,
            installed: false,
            pinned_revision: None,
            last_revisions: None,
            last_messages: Vec::new(),
            last_error: None,
            touched_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateMeta {
    pub schema_version: u8,
    pub last_sync: Option<DateTime<Utc>>,
}

impl Default for StateMeta {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_STATE_SCHEMA_VERSION,
            last_sync: None,
        }
    }
}

/// Everything vimpack remembers between runs, keyed by plugin name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct State {
    pub plugins: BTreeMap<String, PluginState>,
    pub meta: StateMeta,
}
