use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VimpackError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Config file not found at: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("KDL parse error: {0}")]
    KdlError(#[from] kdl::KdlError),

    #[error("IO error at '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    StdIoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error("Install failed for '{plugin}': {reason}")]
    InstallError { plugin: String, reason: String },

    #[error("Update failed for '{plugin}': {reason}")]
    UpdateError { plugin: String, reason: String },

    #[error("Failed to move '{plugin}' from {from} to {to}: {reason}")]
    MoveError {
        plugin: String,
        from: PathBuf,
        to: PathBuf,
        reason: String,
    },

    #[error("Hook failed for '{plugin}': {reason}")]
    HookError { plugin: String, reason: String },

    /// Two stage reports produced an outcome for the same plugin.
    /// Indicates the same plugin was processed twice in one batch.
    #[error("Report conflict: plugin '{plugin}' has outcomes from two stages")]
    ReportConflict { plugin: String },

    #[error("System command '{command}' failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("Backend '{0}' is not available on this system")]
    BackendUnavailable(String),

    #[error("Editor '{0}' is not available; editor-command hooks cannot run")]
    EditorUnavailable(String),

    /// Another batch holds the pack-dir lock.
    #[error("Could not acquire batch lock at '{path}': {reason}")]
    BatchLock { path: PathBuf, reason: String },

    #[error("Operation interrupted by user")]
    Interrupted,

    #[error("Target not found: {0}")]
    TargetNotFound(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, VimpackError>;
