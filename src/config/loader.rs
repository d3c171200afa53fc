//! Config loading: file discovery, parsing, and registry construction.

use crate::config::kdl;
use crate::config::types::{PluginSpec, RawConfig, Settings};
use crate::core::registry::PluginRegistry;
use crate::core::types::{BackendKind, HookSpec, Placement, Plugin};
use crate::error::{Result, VimpackError};
use crate::utils::paths;
use std::fs;
use std::path::{Path, PathBuf};

pub fn build_plugin(spec: &PluginSpec) -> Result<Plugin> {
    let backend = match &spec.backend {
        Some(tag) => tag
            .parse::<BackendKind>()
            .map_err(VimpackError::ConfigError)?,
        None if spec.path.is_some() => BackendKind::Local,
        None => BackendKind::Git,
    };

    let source = match backend {
        BackendKind::Local => spec.path.clone().ok_or_else(|| {
            VimpackError::ConfigError(format!(
                "Local plugin '{}' needs a path=\"...\" property",
                spec.source
            ))
        })?,
        BackendKind::Git => spec.source.clone(),
    };

    let placement = if spec.opt {
        Placement::Opt
    } else {
        Placement::Start
    };

    let mut plugin = Plugin::new(&spec.plugin_name(), &source, placement, backend);
    plugin.frozen = spec.frozen;
    plugin.hook = spec.hook.as_deref().map(HookSpec::from_config_str);
    Ok(plugin)
}

fn build_settings(raw: &RawConfig) -> Result<Settings> {
    let pack_dir = match &raw.pack_dir {
        Some(dir) => paths::expand_home(Path::new(dir))?,
        None => paths::default_pack_dir()?,
    };
    let mut settings = Settings::with_pack_dir(pack_dir);
    if let Some(jobs) = raw.jobs {
        settings.jobs = jobs;
    }
    if let Some(depth) = raw.depth {
        settings.depth = depth;
    }
    if let Some(auto_clean) = raw.auto_clean {
        settings.auto_clean = auto_clean;
    }
    settings.editor = raw.editor.clone();
    Ok(settings)
}

/// Load and validate a config file into settings plus the declared set.
pub fn load(path: &Path) -> Result<(Settings, PluginRegistry)> {
    if !path.exists() {
        return Err(VimpackError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path).map_err(|e| VimpackError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let raw = kdl::parse_kdl_content(&content)?;
    let settings = build_settings(&raw)?;

    let plugins = raw
        .plugins
        .iter()
        .map(build_plugin)
        .collect::<Result<Vec<_>>>()?;
    let registry = PluginRegistry::from_plugins(plugins)?;

    Ok((settings, registry))
}

/// Resolve the config path: explicit flag or the XDG default.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => paths::expand_home(path),
        None => paths::config_file(),
    }
}
