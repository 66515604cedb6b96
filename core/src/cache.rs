//! Memoized filesystem lookups.
//!
//! Every stat and readdir the crate performs goes through [`FsCache`], so a
//! batch run over a tree hits the filesystem once per path and every listing
//! produced between two [`FsCache::clear`] calls reflects a single snapshot.
//! In particular, an `index.html` written during a run was never part of the
//! snapshot and does not appear in listings generated later in that run.

use std::collections::HashMap;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::debug;

/// Shared stat/readdir memoization.
///
/// Successful lookups are kept until [`FsCache::clear`]; failed lookups are
/// returned to the caller and never cached.
#[derive(Default)]
pub struct FsCache {
    stats: RwLock<HashMap<PathBuf, Metadata>>,
    listings: RwLock<HashMap<PathBuf, Vec<String>>>,
}

impl FsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stat `path`, reusing a memoized result when one exists. Symlinks are
    /// followed, matching `std::fs::metadata`.
    pub fn stat(&self, path: &Path) -> io::Result<Metadata> {
        if let Some(meta) = self.stats.read().get(path) {
            return Ok(meta.clone());
        }
        let meta = std::fs::metadata(path)?;
        self.stats.write().insert(path.to_path_buf(), meta.clone());
        Ok(meta)
    }

    /// List the entry names of `dir` in readdir order, reusing a memoized
    /// result when one exists.
    pub fn entries(&self, dir: &Path) -> io::Result<Vec<String>> {
        if let Some(names) = self.listings.read().get(dir) {
            return Ok(names.clone());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        self.listings.write().insert(dir.to_path_buf(), names.clone());
        Ok(names)
    }

    /// Drop every memoized lookup. Both maps are emptied under their write
    /// locks so no reader observes one cleared without the other.
    pub fn clear(&self) {
        let mut stats = self.stats.write();
        let mut listings = self.listings.write();
        stats.clear();
        listings.clear();
        debug!("cleared filesystem caches");
    }
}
