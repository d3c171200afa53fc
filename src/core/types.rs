use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Whether a plugin lives under the always-loaded or the lazy-loaded root.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// `pack/<name>/start` — loaded on editor startup.
    Start,
    /// `pack/<name>/opt` — loaded on demand via `:packadd`.
    Opt,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Opt => write!(f, "opt"),
        }
    }
}

impl Placement {
    pub fn other(self) -> Self {
        match self {
            Self::Start => Self::Opt,
            Self::Opt => Self::Start,
        }
    }
}

// Supported backends.
// To add a new one (e.g. Hg), add a variant here and update:
// - BackendKind::fmt() / from_str()
// - backends::default_set()
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Git,
    /// Plugin sourced from a local directory (symlinked into the pack dir).
    Local,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git => write!(f, "git"),
            Self::Local => write!(f, "local"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "git" => Ok(Self::Git),
            "local" => Ok(Self::Local),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// Post-install/update hook, one of three mutually exclusive variants.
///
/// Config strings starting with `:` become `EditorCommand`; any other
/// string becomes `Shell`. `Callable` is only constructible through the
/// library API.
#[derive(Clone)]
pub enum HookSpec {
    Callable(Arc<dyn Fn(&Plugin) -> Result<()> + Send + Sync>),
    EditorCommand(String),
    Shell(String),
}

impl HookSpec {
    /// Classify a config-supplied hook string.
    pub fn from_config_str(raw: &str) -> Self {
        if let Some(cmd) = raw.strip_prefix(crate::constants::EDITOR_COMMAND_SIGIL) {
            Self::EditorCommand(cmd.to_string())
        } else {
            Self::Shell(raw.to_string())
        }
    }
}

impl fmt::Debug for HookSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable(_) => write!(f, "Callable(..)"),
            Self::EditorCommand(c) => write!(f, "EditorCommand({:?})", c),
            Self::Shell(c) => write!(f, "Shell({:?})", c),
        }
    }
}

/// Runtime fields populated by orchestration stages, never by tasks directly.
#[derive(Debug, Clone, Default)]
pub struct RuntimeInfo {
    /// Before/after revision pair from the last update.
    pub revisions: Option<(String, String)>,
    /// Change-log messages from the last actual update.
    pub messages: Vec<String>,
    pub last_error: Option<String>,
}

/// A managed plugin: identity is the unique name.
#[derive(Debug, Clone)]
pub struct Plugin {
    pub name: String,
    /// Clone URL for git, source directory for local.
    pub source: String,
    pub placement: Placement,
    pub backend: BackendKind,
    /// Exempt from the update stage.
    pub frozen: bool,
    pub hook: Option<HookSpec>,
    pub runtime: RuntimeInfo,
}

impl Plugin {
    pub fn new(name: &str, source: &str, placement: Placement, backend: BackendKind) -> Self {
        Self {
            name: name.to_string(),
            source: source.to_string(),
            placement,
            backend,
            frozen: false,
            hook: None,
            runtime: RuntimeInfo::default(),
        }
    }
}

/// The two pack roots a batch operates on.
#[derive(Debug, Clone)]
pub struct PackLayout {
    pub start_root: PathBuf,
    pub opt_root: PathBuf,
}

impl PackLayout {
    pub fn new(pack_dir: &Path) -> Self {
        Self {
            start_root: pack_dir.join("start"),
            opt_root: pack_dir.join("opt"),
        }
    }

    pub fn root_for(&self, placement: Placement) -> &Path {
        match placement {
            Placement::Start => &self.start_root,
            Placement::Opt => &self.opt_root,
        }
    }

    /// Desired install dir for a plugin.
    pub fn dir_for(&self, plugin: &Plugin) -> PathBuf {
        self.root_for(plugin.placement).join(&plugin.name)
    }

    /// Where the plugin would sit if its placement flag were flipped.
    pub fn wrong_dir_for(&self, plugin: &Plugin) -> PathBuf {
        self.root_for(plugin.placement.other()).join(&plugin.name)
    }
}
