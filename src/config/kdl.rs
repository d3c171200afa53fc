//! KDL parsing for `plugins.kdl`.

use crate::config::types::{PluginSpec, RawConfig};
use crate::error::{Result, VimpackError};
use kdl::{KdlDocument, KdlNode};

pub fn parse_kdl_content(content: &str) -> Result<RawConfig> {
    let doc: KdlDocument = content.parse().map_err(|e: kdl::KdlError| {
        let err_msg = e.to_string();
        let hint = if err_msg.contains("unexpected token") {
            "\nHint: Check for missing quotes, unmatched brackets, or invalid characters."
        } else if err_msg.contains("unexpected end of file") {
            "\nHint: You might be missing a closing brace '}'."
        } else {
            ""
        };
        VimpackError::ConfigError(format!("KDL parsing error: {}{}", err_msg, hint))
    })?;

    let mut config = RawConfig::default();

    for node in doc.nodes() {
        match node.name().value() {
            "settings" => parse_settings_node(node, &mut config)?,
            "plugin" => {
                let spec = parse_plugin_node(node)?;
                config.plugins.push(spec);
            }
            "description" => {}
            other => {
                return Err(VimpackError::ConfigError(format!(
                    "Unknown top-level node '{}'. Expected 'settings' or 'plugin'.",
                    other
                )));
            }
        }
    }

    Ok(config)
}

fn first_string(node: &KdlNode) -> Option<&str> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
}

fn parse_settings_node(node: &KdlNode, config: &mut RawConfig) -> Result<()> {
    let Some(children) = node.children() else {
        return Ok(());
    };
    for child in children.nodes() {
        let name = child.name().value();
        match name {
            "pack-dir" => {
                config.pack_dir = first_string(child).map(str::to_string);
            }
            "editor" => {
                config.editor = first_string(child).map(str::to_string);
            }
            "jobs" => {
                config.jobs = Some(first_integer(child, name)? as usize);
            }
            "depth" => {
                config.depth = Some(first_integer(child, name)? as u32);
            }
            "auto-clean" => {
                config.auto_clean = Some(first_bool(child, name)?);
            }
            other => {
                return Err(VimpackError::ConfigError(format!(
                    "Unknown setting '{}'",
                    other
                )));
            }
        }
    }
    Ok(())
}

fn first_integer(node: &KdlNode, name: &str) -> Result<i128> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_integer())
        .filter(|v| *v >= 0)
        .ok_or_else(|| {
            VimpackError::ConfigError(format!("Setting '{}' expects a non-negative integer", name))
        })
}

fn first_bool(node: &KdlNode, name: &str) -> Result<bool> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_bool())
        .ok_or_else(|| {
            VimpackError::ConfigError(format!("Setting '{}' expects #true or #false", name))
        })
}

fn parse_plugin_node(node: &KdlNode) -> Result<PluginSpec> {
    let source = first_string(node).ok_or_else(|| {
        VimpackError::ConfigError("Each 'plugin' node needs a source string".to_string())
    })?;

    let mut spec = PluginSpec {
        source: source.to_string(),
        ..Default::default()
    };

    for entry in node.entries() {
        let Some(prop) = entry.name() else {
            continue; // positional source, already taken
        };
        let key = prop.value();
        match key {
            "opt" => {
                spec.opt = entry.value().as_bool().ok_or_else(|| {
                    VimpackError::ConfigError(format!(
                        "Property 'opt' on plugin '{}' expects #true or #false",
                        source
                    ))
                })?;
            }
            "frozen" => {
                spec.frozen = entry.value().as_bool().ok_or_else(|| {
                    VimpackError::ConfigError(format!(
                        "Property 'frozen' on plugin '{}' expects #true or #false",
                        source
                    ))
                })?;
            }
            "name" | "backend" | "path" | "do" => {
                let value = entry.value().as_string().ok_or_else(|| {
                    VimpackError::ConfigError(format!(
                        "Property '{}' on plugin '{}' expects a string",
                        key, source
                    ))
                })?;
                match key {
                    "name" => spec.name = Some(value.to_string()),
                    "backend" => spec.backend = Some(value.to_string()),
                    "path" => spec.path = Some(value.to_string()),
                    _ => spec.hook = Some(value.to_string()),
                }
            }
            other => {
                return Err(VimpackError::ConfigError(format!(
                    "Unknown property '{}' on plugin '{}'",
                    other, source
                )));
            }
        }
    }

    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_settings_and_plugins() {
        let content = r#"
settings {
    pack-dir "~/packs"
    jobs 4
    depth 2
    auto-clean #true
    editor "nvim"
}
plugin "tpope/vim-fugitive"
plugin "junegunn/fzf" do="./install --bin"
plugin "preservim/nerdtree" opt=#true frozen=#true
plugin "devstuff" backend="local" path="~/src/devstuff"
"#;
        let config = parse_kdl_content(content).unwrap();
        assert_eq!(config.pack_dir.as_deref(), Some("~/packs"));
        assert_eq!(config.jobs, Some(4));
        assert_eq!(config.depth, Some(2));
        assert_eq!(config.auto_clean, Some(true));
        assert_eq!(config.editor.as_deref(), Some("nvim"));
        assert_eq!(config.plugins.len(), 4);

        let fzf = &config.plugins[1];
        assert_eq!(fzf.hook.as_deref(), Some("./install --bin"));
        let nerdtree = &config.plugins[2];
        assert!(nerdtree.opt && nerdtree.frozen);
        let local = &config.plugins[3];
        assert_eq!(local.backend.as_deref(), Some("local"));
        assert_eq!(local.path.as_deref(), Some("~/src/devstuff"));
    }

    #[test]
    fn rejects_unknown_nodes_and_properties() {
        assert!(parse_kdl_content("packages { foo }").is_err());
        assert!(parse_kdl_content("plugin \"a/b\" color=\"red\"").is_err());
        assert!(parse_kdl_content("settings { speed 9 }").is_err());
    }

    #[test]
    fn plugin_without_source_is_an_error() {
        assert!(parse_kdl_content("plugin opt=#true").is_err());
    }

    #[test]
    fn syntax_errors_carry_a_hint() {
        let err = parse_kdl_content("plugin \"unterminated").unwrap_err();
        assert!(matches!(err, VimpackError::ConfigError(_)));
    }
}
