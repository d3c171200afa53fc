//! Git backend: shell-outs to the system `git`.

use super::traits::{PluginBackend, UpdateOutcome};
use crate::core::types::{BackendKind, Plugin};
use crate::error::{Result, VimpackError};
use crate::utils::cmd;
use std::path::Path;

pub struct GitBackend {
    /// Shallow-clone depth; 0 means full history.
    depth: u32,
}

impl GitBackend {
    pub fn new(depth: u32) -> Self {
        Self { depth }
    }

    /// `owner/repo` shorthands expand to GitHub; anything with a scheme or
    /// an scp-style `git@` prefix is used verbatim.
    fn clone_url(source: &str) -> String {
        if source.contains("://") || source.starts_with("git@") {
            source.to_string()
        } else {
            format!("https://github.com/{}.git", source)
        }
    }

    fn rev_parse(dir: &Path) -> Result<String> {
        let out = cmd::run_checked("git", &["-C", &dir.to_string_lossy(), "rev-parse", "HEAD"], None)?;
        Ok(out.trim().to_string())
    }
}

impl PluginBackend for GitBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Git
    }

    fn is_available(&self) -> bool {
        which::which("git").is_ok()
    }

    fn install(&self, plugin: &Plugin, dir: &Path) -> Result<()> {
        let url = Self::clone_url(&plugin.source);
        let dir_str = dir.to_string_lossy().into_owned();
        let depth_arg;

        let mut args = vec!["clone", "--quiet", "--recurse-submodules"];
        if self.depth > 0 {
            depth_arg = format!("--depth={}", self.depth);
            args.push(&depth_arg);
        }
        args.push(&url);
        args.push(&dir_str);

        cmd::run_checked("git", &args, None).map_err(|e| VimpackError::InstallError {
            plugin: plugin.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn update(&self, plugin: &Plugin, dir: &Path) -> Result<UpdateOutcome> {
        let dir_str = dir.to_string_lossy().into_owned();
        let before = Self::rev_parse(dir)?;

        cmd::run_checked("git", &["-C", &dir_str, "pull", "--ff-only", "--quiet"], None)
            .map_err(|e| VimpackError::UpdateError {
                plugin: plugin.name.clone(),
                reason: e.to_string(),
            })?;

        let after = Self::rev_parse(dir)?;

        let messages = if before != after {
            let range = format!("{}..{}", before, after);
            let log = cmd::run_checked(
                "git",
                &["-C", &dir_str, "log", "--pretty=format:%s", &range],
                None,
            )?;
            log.lines().map(str::to_string).collect()
        } else {
            Vec::new()
        };

        Ok(UpdateOutcome {
            before,
            after,
            messages,
        })
    }

    fn head_revision(&self, dir: &Path) -> Result<String> {
        Self::rev_parse(dir)
    }

    // A clone that lost its .git (interrupted install, manual meddling)
    // cannot be updated and gets reinstalled via the dirty path.
    fn is_intact(&self, dir: &Path) -> bool {
        dir.join(".git").exists()
    }

    fn checkout(&self, dir: &Path, revision: &str) -> Result<()> {
        let dir_str = dir.to_string_lossy().into_owned();
        // Shallow clones may not have the revision yet.
        let _ = cmd::run("git", &["-C", &dir_str, "fetch", "--quiet", "--unshallow"], None);
        cmd::run_checked("git", &["-C", &dir_str, "checkout", "--quiet", revision], None)?;
        Ok(())
    }

    fn revert_last(&self, plugin: &Plugin, dir: &Path) -> Result<()> {
        let dir_str = dir.to_string_lossy().into_owned();
        cmd::run_checked("git", &["-C", &dir_str, "reset", "--hard", "--quiet", "ORIG_HEAD"], None)
            .map_err(|e| VimpackError::UpdateError {
                plugin: plugin.name.clone(),
                reason: format!("revert failed: {}", e),
            })?;
        Ok(())
    }

    fn diff(&self, _plugin: &Plugin, dir: &Path, revision: &str) -> Result<String> {
        let dir_str = dir.to_string_lossy().into_owned();
        cmd::run_checked("git", &["-C", &dir_str, "diff", revision], None)
    }
}
