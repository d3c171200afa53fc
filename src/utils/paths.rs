use crate::error::{Result, VimpackError};
use directories::{BaseDirs, ProjectDirs, UserDirs};
use std::path::{Path, PathBuf};

pub fn expand_home(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_string_lossy();

    if !path_str.starts_with('~') {
        return Ok(path.to_path_buf());
    }

    let user_dirs = UserDirs::new().ok_or_else(|| {
        VimpackError::Other("Could not determine user home directory".to_string())
    })?;

    let home = user_dirs.home_dir();

    if path_str == "~" {
        return Ok(home.to_path_buf());
    }

    let stripped = path_str
        .strip_prefix("~/")
        .ok_or_else(|| VimpackError::Other(format!("Invalid path format: {}", path_str)))?;

    Ok(home.join(stripped))
}

pub fn config_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from("com", "vimpack", "vimpack").ok_or_else(|| {
        VimpackError::Other("Could not determine config directory".to_string())
    })?;
    Ok(proj.config_dir().to_path_buf())
}

pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(crate::constants::CONFIG_FILE_NAME))
}

pub fn lockfile_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(crate::constants::LOCKFILE_NAME))
}

/// Default pack dir: `<data-dir>/nvim/site/pack/vimpack`.
pub fn default_pack_dir() -> Result<PathBuf> {
    let base = BaseDirs::new().ok_or_else(|| {
        VimpackError::Other("Could not determine data directory".to_string())
    })?;
    Ok(base
        .data_local_dir()
        .join("nvim")
        .join("site")
        .join("pack")
        .join("vimpack"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_home_leaves_absolute_paths_alone() {
        let p = PathBuf::from("/tmp/somewhere");
        assert_eq!(expand_home(&p).unwrap(), p);
    }

    #[test]
    fn expand_home_replaces_tilde() {
        let expanded = expand_home(Path::new("~/plugins")).unwrap();
        assert!(!expanded.to_string_lossy().contains('~'));
        assert!(expanded.ends_with("plugins"));
    }
}
