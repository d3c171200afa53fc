pub mod git;
pub mod local;
pub mod traits;

use crate::core::types::BackendKind;
use crate::error::{Result, VimpackError};
use std::collections::HashMap;
use traits::PluginBackend;

/// The backends a batch may dispatch to, keyed by kind.
pub struct BackendSet {
    backends: HashMap<BackendKind, Box<dyn PluginBackend>>,
}

impl BackendSet {
    pub fn new() -> Self {
        Self {
            backends: HashMap::new(),
        }
    }

    pub fn register(&mut self, backend: Box<dyn PluginBackend>) {
        self.backends.insert(backend.kind(), backend);
    }

    pub fn get(&self, kind: BackendKind) -> Result<&dyn PluginBackend> {
        self.backends
            .get(&kind)
            .map(|b| b.as_ref())
            .ok_or_else(|| VimpackError::BackendUnavailable(kind.to_string()))
    }
}

impl Default for BackendSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Backends shipped with the binary.
pub fn default_set(clone_depth: u32) -> BackendSet {
    let mut set = BackendSet::new();
    set.register(Box::new(git::GitBackend::new(clone_depth)));
    set.register(Box::new(local::LocalBackend::new()));
    set
}
