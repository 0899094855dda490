//! Startup sequence for a monitored tree.
//!
//! Watches the root first so nothing created during the walk goes unnoticed,
//! walks the tree (root included) into a fresh index, then registers a watch
//! on every directory the walk found. Afterwards each indexed directory has
//! exactly one watch registration. Events that raced with the walk are applied
//! afterwards by the mutator; creation replaces existing entries, so they
//! cannot introduce duplicates.

use std::path::Path;

use crate::config::WalkConfig;
use crate::index::PathIndex;
use crate::walker::TreeWalker;
use crate::watcher::{IndexMutator, WatchBackend, WatchError, WatchManager};

/// Build the initial index and watch set for `root`.
///
/// Only the root watch is fatal. Failed subdirectory watches and unreadable
/// subtrees are logged and skipped.
pub fn prepare<B: WatchBackend>(
    root: &Path,
    backend: B,
    walk: &WalkConfig,
) -> Result<IndexMutator<B>, WatchError> {
    let mut watches = WatchManager::new(backend);
    watches.watch_root(root)?;

    let index = PathIndex::shared();
    let summary = {
        let mut guard = index.write();
        TreeWalker::new(walk.clone()).populate(root, &mut guard)
    };

    let mut failed = 0;
    for dir in &summary.directories {
        if let Err(e) = watches.add_watch(dir) {
            failed += 1;
            tracing::error!("[watcher] {e}");
        }
    }

    if failed > 0 || summary.errors > 0 {
        tracing::warn!(
            "[monitor] coverage incomplete: {failed} directories unwatched, {} subtrees unreadable",
            summary.errors
        );
    }

    crate::log_event!(
        "monitor",
        "ready",
        "{} paths, {} watches",
        summary.indexed,
        watches.watch_count()
    );

    Ok(IndexMutator::new(index, watches))
}
