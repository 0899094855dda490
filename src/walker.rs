//! Startup scan of the monitored tree.
//!
//! This module walks the root directory once and feeds every path it finds
//! into the path index:
//! - Symlinks are not followed by default
//! - Other filesystems are skipped by default
//! - Unreadable subtrees are logged and skipped; the walk goes on
//!
//! The root is indexed like any other directory, ahead of everything under
//! it. Installing watches is not the walker's job: [`TreeWalker::populate`]
//! returns the directories found below the root so the caller can register
//! them next to its root watch.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::WalkConfig;
use crate::index::{PathIndex, entry_for};

/// One path found by the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Outcome of populating an index.
#[derive(Debug, Default)]
pub struct WalkSummary {
    /// Number of paths added to the index, the root included.
    pub indexed: usize,
    /// Directories found under the root, in walk order, the root excluded.
    pub directories: Vec<PathBuf>,
    /// Number of subtrees skipped because of errors.
    pub errors: usize,
}

/// Walks a directory tree to discover every path under it
pub struct TreeWalker {
    config: WalkConfig,
}

impl TreeWalker {
    /// Create a new tree walker with the given settings
    pub fn new(config: WalkConfig) -> Self {
        Self { config }
    }

    /// Visit every path under `root`, the root itself excluded.
    ///
    /// Returns the entries found and the number of errors skipped.
    pub fn walk(&self, root: &Path) -> (Vec<WalkEntry>, usize) {
        let walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(self.config.follow_links)
            .same_file_system(self.config.same_file_system);

        let mut entries = Vec::new();
        let mut errors = 0;

        for result in walker {
            match result {
                Ok(entry) => entries.push(WalkEntry {
                    is_dir: entry.file_type().is_dir(),
                    path: entry.into_path(),
                }),
                Err(e) => {
                    errors += 1;
                    let location = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string());
                    tracing::warn!("[walker] skipping {location}: {e}");
                }
            }
        }

        (entries, errors)
    }

    /// Append `root` and every path under it to `index`.
    ///
    /// A root that is not a readable directory is not indexed; the walk
    /// reports it as an error.
    pub fn populate(&self, root: &Path, index: &mut PathIndex) -> WalkSummary {
        let mut summary = WalkSummary::default();
        if root.is_dir() {
            index.add(entry_for(root));
            summary.indexed += 1;
        }

        let (entries, errors) = self.walk(root);
        summary.errors = errors;

        for entry in entries {
            index.add(entry_for(&entry.path));
            summary.indexed += 1;
            if entry.is_dir {
                summary.directories.push(entry.path);
            }
        }

        crate::log_event!(
            "walker",
            "scanned",
            "{} paths ({} directories) under {}",
            summary.indexed,
            summary.directories.len(),
            root.display()
        );

        summary
    }
}
