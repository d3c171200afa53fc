use crate::constants;
use std::path::PathBuf;

/// Resolved settings for a batch, after defaults and `~` expansion.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root holding the `start/` and `opt/` dirs.
    pub pack_dir: PathBuf,
    /// Concurrency limit for install/update batches; 0 = batch size.
    pub jobs: usize,
    /// Shallow-clone depth for the git backend; 0 = full history.
    pub depth: u32,
    /// Remove extra/dirty dirs without asking.
    pub auto_clean: bool,
    /// Editor command line for the hook bridge (e.g. "nvim").
    pub editor: Option<String>,
}

impl Settings {
    pub fn with_pack_dir(pack_dir: PathBuf) -> Self {
        Self {
            pack_dir,
            jobs: constants::DEFAULT_JOBS,
            depth: constants::DEFAULT_CLONE_DEPTH,
            auto_clean: false,
            editor: None,
        }
    }
}

/// One `plugin` node as written in the config, before registry validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginSpec {
    /// `owner/repo`, a full URL, or a plain name for local plugins.
    pub source: String,
    /// Explicit name override; defaults to the last source path segment.
    pub name: Option<String>,
    pub opt: bool,
    pub frozen: bool,
    /// Backend tag; inferred as `local` when `path` is set, `git` otherwise.
    pub backend: Option<String>,
    /// Source directory for local plugins.
    pub path: Option<String>,
    /// Raw post-install/update hook string (`:`-prefixed = editor command).
    pub hook: Option<String>,
}

impl PluginSpec {
    /// Plugin name: explicit override, else last path segment of the
    /// source with a trailing `.git` stripped.
    pub fn plugin_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let tail = self
            .source
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.source);
        tail.trim_end_matches(".git").to_string()
    }
}

/// Parse result of a config file before path resolution.
#[derive(Debug, Clone, Default)]
pub struct RawConfig {
    pub pack_dir: Option<String>,
    pub jobs: Option<usize>,
    pub depth: Option<u32>,
    pub auto_clean: Option<bool>,
    pub editor: Option<String>,
    pub plugins: Vec<PluginSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_name_is_last_segment_without_git_suffix() {
        let spec = PluginSpec {
            source: "https://github.com/tpope/vim-fugitive.git".to_string(),
            ..Default::default()
        };
        assert_eq!(spec.plugin_name(), "vim-fugitive");

        let short = PluginSpec {
            source: "junegunn/fzf".to_string(),
            ..Default::default()
        };
        assert_eq!(short.plugin_name(), "fzf");
    }

    #[test]
    fn explicit_name_wins() {
        let spec = PluginSpec {
            source: "owner/repo".to_string(),
            name: Some("renamed".to_string()),
            ..Default::default()
        };
        assert_eq!(spec.plugin_name(), "renamed");
    }
}
