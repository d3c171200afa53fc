//! Filesystem-state resolution: classifies every directory under the two
//! pack roots against the declared plugin set.

use crate::backends::BackendSet;
use crate::core::registry::PluginRegistry;
use crate::core::types::{PackLayout, Placement};
use crate::error::{Result, VimpackError};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Five-way partition of the pack roots. Disjoint by construction: every
/// on-disk directory lands in exactly one of start/opt/extra/dirty, and
/// `missing` names never correspond to an on-disk directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementState {
    /// Correctly placed under the always-loaded root.
    pub start: BTreeSet<String>,
    /// Correctly placed under the lazy-loaded root.
    pub opt: BTreeSet<String>,
    /// Declared but absent on disk.
    pub missing: BTreeSet<String>,
    /// Present but undeclared, or a declared plugin under the wrong root.
    pub extra: BTreeSet<PathBuf>,
    /// Present at the desired location but failing the backend integrity
    /// probe (e.g. a clone that lost its .git).
    pub dirty: BTreeSet<PathBuf>,
}

impl PlacementState {
    /// Union of the removal candidate categories.
    pub fn clean_candidates(&self) -> Vec<PathBuf> {
        self.extra.iter().chain(self.dirty.iter()).cloned().collect()
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.start.contains(name) || self.opt.contains(name)
    }

    /// Names of every correctly installed plugin.
    pub fn installed(&self) -> impl Iterator<Item = &String> {
        self.start.iter().chain(self.opt.iter())
    }
}

/// Present on disk in any form, including a dangling symlink left by a
/// deleted local source.
fn entry_present(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn list_entries(root: &Path) -> Result<BTreeSet<PathBuf>> {
    let mut dirs = BTreeSet::new();
    if !root.exists() {
        return Ok(dirs);
    }
    let entries = fs::read_dir(root).map_err(|e| VimpackError::IoError {
        path: root.to_path_buf(),
        source: e,
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| VimpackError::IoError {
            path: root.to_path_buf(),
            source: e,
        })?;
        let file_type = entry.file_type().map_err(|e| VimpackError::IoError {
            path: entry.path(),
            source: e,
        })?;
        // Stray files under a pack root are not install dirs; ignore them.
        if file_type.is_dir() || file_type.is_symlink() {
            dirs.insert(entry.path());
        }
    }
    Ok(dirs)
}

/// Classify the pack roots against the declared set. Pure with respect to
/// program state: reads only the two roots, never mutates anything, and
/// reproduces the identical partition when nothing changed on disk.
pub fn resolve(
    registry: &PluginRegistry,
    layout: &PackLayout,
    backends: &BackendSet,
) -> Result<PlacementState> {
    let mut state = PlacementState::default();
    let mut claimed: BTreeSet<PathBuf> = BTreeSet::new();

    for plugin in registry.iter() {
        let desired = layout.dir_for(plugin);
        if !entry_present(&desired) {
            state.missing.insert(plugin.name.clone());
            continue;
        }
        claimed.insert(desired.clone());

        let backend = backends.get(plugin.backend)?;
        if backend.is_intact(&desired) {
            match plugin.placement {
                Placement::Start => state.start.insert(plugin.name.clone()),
                Placement::Opt => state.opt.insert(plugin.name.clone()),
            };
        } else {
            state.dirty.insert(desired);
        }
    }

    for root in [&layout.start_root, &layout.opt_root] {
        for path in list_entries(root)? {
            if !claimed.contains(&path) {
                state.extra.insert(path);
            }
        }
    }

    Ok(state)
}
