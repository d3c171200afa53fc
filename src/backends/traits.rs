use crate::core::types::{BackendKind, Plugin};
use crate::error::{Result, VimpackError};
use std::path::Path;

/// Before/after revision pair plus change-log messages from an update.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub before: String,
    pub after: String,
    pub messages: Vec<String>,
}

impl UpdateOutcome {
    /// An actual update occurred iff the two revisions differ.
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

/// Capability contract every backend must satisfy. The pipeline never
/// reaches around this trait to touch backend-specific tooling.
pub trait PluginBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn is_available(&self) -> bool;

    /// Install the plugin into `dir`. The pipeline verifies the directory
    /// exists afterwards; backends need not guarantee it on error paths.
    fn install(&self, plugin: &Plugin, dir: &Path) -> Result<()>;

    fn update(&self, plugin: &Plugin, dir: &Path) -> Result<UpdateOutcome>;

    /// Current revision of an installed plugin, for the lockfile.
    fn head_revision(&self, dir: &Path) -> Result<String>;

    /// Integrity probe for the resolver's `dirty` classification.
    fn is_intact(&self, dir: &Path) -> bool {
        dir.is_dir()
    }

    /// Pin an installed plugin to a specific revision (lockfile restore).
    fn checkout(&self, _dir: &Path, _revision: &str) -> Result<()> {
        Err(VimpackError::Other(format!(
            "backend '{}' does not support checkout",
            self.kind()
        )))
    }

    /// Undo the most recent update.
    fn revert_last(&self, plugin: &Plugin, _dir: &Path) -> Result<()> {
        Err(VimpackError::Other(format!(
            "backend '{}' cannot revert '{}'",
            self.kind(),
            plugin.name
        )))
    }

    /// Diff of the working tree against `revision`.
    fn diff(&self, plugin: &Plugin, _dir: &Path, _revision: &str) -> Result<String> {
        Err(VimpackError::Other(format!(
            "backend '{}' does not support diff for '{}'",
            self.kind(),
            plugin.name
        )))
    }
}
