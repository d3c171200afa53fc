//! State persistence and the single-batch file lock.

use crate::constants::BATCH_LOCK_FILE;
use crate::error::{Result, VimpackError};
use crate::state::types::State;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::Path;

pub fn load_state(path: &Path) -> Result<State> {
    if !path.exists() {
        return Ok(State::default());
    }
    let content = fs::read_to_string(path).map_err(|e| VimpackError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_state(path: &Path, state: &State) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| VimpackError::IoError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let content = serde_json::to_string_pretty(state)?;
    fs::write(path, content).map_err(|e| VimpackError::IoError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Exclusive lock on the pack dir for the duration of a mutating batch.
/// The design assumes one batch at a time per managed set; this makes a
/// second concurrent invocation fail fast instead of corrupting dirs.
#[derive(Debug)]
pub struct BatchLock {
    file: File,
}

impl BatchLock {
    pub fn acquire(pack_dir: &Path) -> Result<Self> {
        fs::create_dir_all(pack_dir).map_err(|e| VimpackError::IoError {
            path: pack_dir.to_path_buf(),
            source: e,
        })?;
        let path = pack_dir.join(BATCH_LOCK_FILE);
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| VimpackError::IoError {
                path: path.clone(),
                source: e,
            })?;
        file.try_lock_exclusive().map_err(|e| VimpackError::BatchLock {
            path,
            reason: format!("{} (is another vimpack run active?)", e),
        })?;
        Ok(Self { file })
    }
}

impl Drop for BatchLock {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{BackendKind, Placement};
    use crate::state::types::PluginState;

    #[test]
    fn state_round_trips_through_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("state").join("vimpack.lock.json");

        let mut state = State::default();
        let mut record = PluginState::new(BackendKind::Git, Placement::Start);
        record.installed = true;
        record.last_messages = vec!["fix: thing".to_string()];
        state.plugins.insert("fzf".to_string(), record);

        save_state(&path, &state).unwrap();
        let loaded = load_state(&path).unwrap();
        assert!(loaded.plugins["fzf"].installed);
        assert_eq!(loaded.plugins["fzf"].last_messages, vec!["fix: thing"]);
    }

    #[test]
    fn missing_state_file_loads_default() {
        let tmp = tempfile::tempdir().unwrap();
        let state = load_state(&tmp.path().join("absent.json")).unwrap();
        assert!(state.plugins.is_empty());
    }

    #[test]
    fn second_batch_lock_fails_fast() {
        let tmp = tempfile::tempdir().unwrap();
        let _held = BatchLock::acquire(tmp.path()).unwrap();
        let err = BatchLock::acquire(tmp.path()).unwrap_err();
        assert!(matches!(err, VimpackError::BatchLock { .. }));
    }
}
