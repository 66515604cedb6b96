//! Depth-first directory enumeration.

use std::path::{Path, PathBuf};

use crate::cache::FsCache;
use crate::error::Result;

/// One walked filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path to the entry, rooted wherever the walk started.
    pub path: PathBuf,
    /// Whether the entry is a directory.
    pub is_directory: bool,
}

/// Enumerate everything under `root`, depth-first and pre-order: each
/// directory is emitted before its descendants, siblings stay in readdir
/// order. `root` itself is not part of the result.
///
/// All lookups go through `cache`, so a walk primes the cache for the
/// builds that follow it.
pub fn walk(cache: &FsCache, root: &Path) -> Result<Vec<FileEntry>> {
    let mut entries = Vec::new();
    walk_into(cache, root, &mut entries)?;
    Ok(entries)
}

fn walk_into(cache: &FsCache, dir: &Path, entries: &mut Vec<FileEntry>) -> Result<()> {
    for name in cache.entries(dir)? {
        let path = dir.join(&name);
        if cache.stat(&path)?.is_dir() {
            entries.push(FileEntry { path: path.clone(), is_directory: true });
            walk_into(cache, &path, entries)?;
        } else {
            entries.push(FileEntry { path, is_directory: false });
        }
    }
    Ok(())
}
