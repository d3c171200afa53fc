//! Crate-wide defaults and fixed names.

/// Shallow-clone depth used by the git backend when none is configured.
pub const DEFAULT_CLONE_DEPTH: u32 = 1;

/// `jobs 0` in the config means "one task in flight per queued task".
pub const DEFAULT_JOBS: usize = 0;

/// Subdirectory of an install dir holding documentation sources.
pub const DOC_DIR: &str = "doc";

/// Generated helptags index file name (Vim convention).
pub const TAGS_FILE: &str = "tags";

/// Extension of documentation source files scanned for tags.
pub const DOC_EXTENSION: &str = "txt";

/// Lock file guarding a pack dir against concurrent batches.
pub const BATCH_LOCK_FILE: &str = ".vimpack.lock";

/// Lockfile (revision snapshot) name inside the config dir.
pub const LOCKFILE_NAME: &str = "vimpack.lock.json";

/// Config file name inside the config dir.
pub const CONFIG_FILE_NAME: &str = "plugins.kdl";

/// Leading sigil marking a hook string as an editor command.
pub const EDITOR_COMMAND_SIGIL: char = ':';
