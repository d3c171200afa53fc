//! Local-directory backend: symlinks a plugin checked out elsewhere on disk.

use super::traits::{PluginBackend, UpdateOutcome};
use crate::core::types::{BackendKind, Plugin};
use crate::error::{Result, VimpackError};
use crate::utils::paths;
use std::path::Path;

pub struct LocalBackend;

impl LocalBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
fn make_link(source: &Path, dest: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, dest)
}

#[cfg(windows)]
fn make_link(source: &Path, dest: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(source, dest)
}

impl PluginBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn is_available(&self) -> bool {
        true
    }

    fn install(&self, plugin: &Plugin, dir: &Path) -> Result<()> {
        let source = paths::expand_home(Path::new(&plugin.source))?;
        if !source.is_dir() {
            return Err(VimpackError::InstallError {
                plugin: plugin.name.clone(),
                reason: format!("source directory '{}' does not exist", source.display()),
            });
        }
        make_link(&source, dir).map_err(|e| VimpackError::InstallError {
            plugin: plugin.name.clone(),
            reason: format!("symlink failed: {}", e),
        })
    }

    // Local plugins track their source directly; there is nothing to pull.
    fn update(&self, _plugin: &Plugin, _dir: &Path) -> Result<UpdateOutcome> {
        Ok(UpdateOutcome {
            before: "local".to_string(),
            after: "local".to_string(),
            messages: Vec::new(),
        })
    }

    fn head_revision(&self, _dir: &Path) -> Result<String> {
        Ok("local".to_string())
    }

    /// A dangling symlink (source deleted) fails the probe and is
    /// reconciled through the dirty path.
    fn is_intact(&self, dir: &Path) -> bool {
        dir.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Placement;

    #[test]
    fn install_links_to_source_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("devplugin");
        std::fs::create_dir(&source).unwrap();
        std::fs::write(source.join("plugin.vim"), "\" hi").unwrap();

        let dest = tmp.path().join("start").join("devplugin");
        std::fs::create_dir_all(dest.parent().unwrap()).unwrap();

        let plugin = Plugin::new(
            "devplugin",
            source.to_str().unwrap(),
            Placement::Start,
            BackendKind::Local,
        );
        let backend = LocalBackend::new();
        backend.install(&plugin, &dest).unwrap();

        assert!(backend.is_intact(&dest));
        assert!(dest.join("plugin.vim").exists());
    }

    #[test]
    fn install_rejects_missing_source() {
        let tmp = tempfile::tempdir().unwrap();
        let plugin = Plugin::new(
            "ghost",
            tmp.path().join("nope").to_str().unwrap(),
            Placement::Start,
            BackendKind::Local,
        );
        let err = LocalBackend::new()
            .install(&plugin, &tmp.path().join("dest"))
            .unwrap_err();
        assert!(matches!(err, VimpackError::InstallError { .. }));
    }

    #[test]
    fn dangling_link_is_not_intact() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("src");
        std::fs::create_dir(&source).unwrap();
        let dest = tmp.path().join("dest");
        make_link(&source, &dest).unwrap();
        let backend = LocalBackend::new();
        assert!(backend.is_intact(&dest));

        std::fs::remove_dir(&source).unwrap();
        assert!(!backend.is_intact(&dest));
    }
}
