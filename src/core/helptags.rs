//! Helptags index generation and staleness detection.
//!
//! Mirrors `:helptags`: documentation sources are `doc/*.txt`, the index is
//! `doc/tags` with one `tag<TAB>file<TAB>/*tag*` line per tag.

use crate::constants::{DOC_DIR, DOC_EXTENSION, TAGS_FILE};
use crate::error::{Result, VimpackError};
use rayon::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*([^\s*|]+)\*").expect("static pattern is valid"))
}

fn doc_sources(doc_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut sources = Vec::new();
    if !doc_dir.is_dir() {
        return Ok(sources);
    }
    for entry in fs::read_dir(doc_dir).map_err(|e| VimpackError::IoError {
        path: doc_dir.to_path_buf(),
        source: e,
    })? {
        let path = entry
            .map_err(|e| VimpackError::IoError {
                path: doc_dir.to_path_buf(),
                source: e,
            })?
            .path();
        if path.extension().is_some_and(|ext| ext == DOC_EXTENSION) {
            sources.push(path);
        }
    }
    sources.sort();
    Ok(sources)
}

fn index_files(doc_dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(doc_dir) else {
        return Vec::new();
    };
    let mut indexes: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(TAGS_FILE))
        })
        .collect();
    indexes.sort();
    indexes
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// An index is stale iff sources exist and either no index exists or the
/// newest source is younger than the oldest index file. No sources at all
/// means not-stale: nothing to index, any leftover index stays untouched.
pub fn is_stale(install_dir: &Path) -> Result<bool> {
    let doc_dir = install_dir.join(DOC_DIR);
    let sources = doc_sources(&doc_dir)?;
    if sources.is_empty() {
        return Ok(false);
    }
    let indexes = index_files(&doc_dir);
    if indexes.is_empty() {
        return Ok(true);
    }

    let newest_source = sources.iter().filter_map(|p| mtime(p)).max();
    let oldest_index = indexes.iter().filter_map(|p| mtime(p)).min();
    match (newest_source, oldest_index) {
        (Some(source), Some(index)) => Ok(source > index),
        // Unreadable metadata: regenerate rather than trust a ghost.
        _ => Ok(true),
    }
}

/// Scan doc sources and write a sorted `doc/tags`. Returns the tag count.
/// First occurrence wins for duplicate tags, like `:helptags`.
pub fn generate(install_dir: &Path) -> Result<usize> {
    let doc_dir = install_dir.join(DOC_DIR);
    let sources = doc_sources(&doc_dir)?;
    let mut tags: BTreeMap<String, String> = BTreeMap::new();

    for source in &sources {
        let content = fs::read_to_string(source).map_err(|e| VimpackError::IoError {
            path: source.clone(),
            source: e,
        })?;
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        for capture in tag_pattern().captures_iter(&content) {
            let tag = capture[1].to_string();
            tags.entry(tag).or_insert_with(|| file_name.clone());
        }
    }

    let mut index = String::new();
    for (tag, file) in &tags {
        index.push_str(&format!("{}\t{}\t/*{}*\n", tag, file, tag));
    }

    let index_path = doc_dir.join(TAGS_FILE);
    fs::write(&index_path, index).map_err(|e| VimpackError::IoError {
        path: index_path,
        source: e,
    })?;

    Ok(tags.len())
}

/// Regenerate iff stale. Returns whether an index was written.
pub fn regenerate_if_stale(install_dir: &Path) -> Result<bool> {
    if !is_stale(install_dir)? {
        return Ok(false);
    }
    generate(install_dir)?;
    Ok(true)
}

/// Per-plugin regeneration across a batch; pure filesystem work, so it
/// fans out on the rayon pool rather than the task scheduler.
pub fn regenerate_batch(dirs: &[(String, PathBuf)]) -> Vec<(String, Result<bool>)> {
    dirs.par_iter()
        .map(|(name, dir)| (name.clone(), regenerate_if_stale(dir)))
        .collect()
}
