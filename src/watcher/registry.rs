//! Registry of directories with an active watch.
//!
//! Mirrors what the backend is watching so the mutator can answer "is this
//! a watched directory?" after the directory itself is gone from disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Set of watched directories.
#[derive(Debug, Default)]
pub struct WatchRegistry {
    dirs: HashSet<PathBuf>,
}

impl WatchRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a watch on `dir`. Returns `false` if it was already recorded.
    pub fn insert(&mut self, dir: PathBuf) -> bool {
        self.dirs.insert(dir)
    }

    /// Forget the watch on `dir`. Returns `false` if it was not recorded.
    pub fn remove(&mut self, dir: &Path) -> bool {
        self.dirs.remove(dir)
    }

    pub fn contains(&self, dir: &Path) -> bool {
        self.dirs.contains(dir)
    }

    /// Get count of watched directories.
    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}
