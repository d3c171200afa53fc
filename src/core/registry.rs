//! The declared plugin set, passed explicitly through the pipeline.

use crate::core::report::{Outcome, Report};
use crate::core::types::Plugin;
use crate::error::{Result, VimpackError};
use std::collections::BTreeMap;

/// Registry of declared plugins, keyed by unique name. Built once from
/// configuration; runtime fields are only mutated between stages via
/// [`PluginRegistry::apply_report`].
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: BTreeMap<String, Plugin>,
}

impl PluginRegistry {
    pub fn from_plugins(plugins: Vec<Plugin>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for plugin in plugins {
            if map.contains_key(&plugin.name) {
                return Err(VimpackError::ConfigError(format!(
                    "duplicate plugin name '{}'",
                    plugin.name
                )));
            }
            map.insert(plugin.name.clone(), plugin);
        }
        Ok(Self { plugins: map })
    }

    pub fn get(&self, name: &str) -> Option<&Plugin> {
        self.plugins.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plugin> {
        self.plugins.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.plugins.keys()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Split a caller-supplied name filter into declared and unknown names.
    /// `None` means the whole declared set participates.
    pub fn filter_names(&self, requested: Option<&[String]>) -> (Vec<String>, Vec<String>) {
        match requested {
            None => (self.plugins.keys().cloned().collect(), Vec::new()),
            Some(names) => {
                let mut matched = Vec::new();
                let mut unknown = Vec::new();
                for name in names {
                    if self.plugins.contains_key(name) {
                        if !matched.contains(name) {
                            matched.push(name.clone());
                        }
                    } else {
                        unknown.push(name.clone());
                    }
                }
                (matched, unknown)
            }
        }
    }

    /// Fold a stage report into plugin runtime fields. Only orchestration
    /// calls this, after the stage's tasks have all completed.
    pub fn apply_report(&mut self, report: &Report) {
        for (name, outcome) in report {
            let Some(plugin) = self.plugins.get_mut(name) else {
                continue;
            };
            match outcome {
                Outcome::Updated {
                    before,
                    after,
                    messages,
                } => {
                    plugin.runtime.revisions = Some((before.clone(), after.clone()));
                    plugin.runtime.messages = messages.clone();
                    plugin.runtime.last_error = None;
                }
                Outcome::Failed { errors } => {
                    plugin.runtime.last_error = errors.first().cloned();
                }
                Outcome::Installed
                | Outcome::UpToDate
                | Outcome::Frozen
                | Outcome::Moved { .. } => {
                    plugin.runtime.last_error = None;
                }
            }
        }
    }
}
