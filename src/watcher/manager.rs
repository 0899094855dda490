//! Per-directory watch registration.
//!
//! The OS primitive watches one directory at a time (`NonRecursive`); full
//! tree coverage comes from registering every directory the walk or the
//! mutator discovers. [`WatchBackend`] is the seam over that primitive so the
//! registration logic can run against a recording double in tests.

use std::path::Path;

use notify::{Event, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::error::WatchError;
use super::registry::WatchRegistry;

/// Receiving end for raw events produced by a notify watcher.
pub type EventReceiver = mpsc::Receiver<notify::Result<Event>>;

/// OS-level watch primitive scoped to a single directory.
pub trait WatchBackend: Send {
    /// Start delivering events for the direct children of `path`.
    fn watch(&mut self, path: &Path) -> notify::Result<()>;

    /// Stop delivering events for `path`.
    fn unwatch(&mut self, path: &Path) -> notify::Result<()>;
}

impl WatchBackend for notify::RecommendedWatcher {
    fn watch(&mut self, path: &Path) -> notify::Result<()> {
        Watcher::watch(self, path, RecursiveMode::NonRecursive)
    }

    fn unwatch(&mut self, path: &Path) -> notify::Result<()> {
        Watcher::unwatch(self, path)
    }
}

/// Create the platform watcher and the channel its events arrive on.
///
/// The notify callback runs on the watcher's own thread, so it may block
/// when the mutator falls behind and the channel is full.
pub fn recommended_backend(
    capacity: usize,
) -> Result<(notify::RecommendedWatcher, EventReceiver), WatchError> {
    let (tx, rx) = mpsc::channel(capacity.max(1));

    let watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
        let _ = tx.blocking_send(res);
    })?;

    Ok((watcher, rx))
}

/// Tracks one watch registration per directory on top of a backend.
pub struct WatchManager<B: WatchBackend> {
    backend: B,
    registry: WatchRegistry,
}

impl<B: WatchBackend> WatchManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            registry: WatchRegistry::new(),
        }
    }

    /// Establish the primary watch on `root`.
    ///
    /// Unlike [`add_watch`](Self::add_watch) a failure here is fatal to the
    /// caller: nothing under the tree would ever be observed.
    pub fn watch_root(&mut self, root: &Path) -> Result<(), WatchError> {
        self.backend
            .watch(root)
            .map_err(|e| WatchError::RootWatchFailed {
                path: root.to_path_buf(),
                reason: e.to_string(),
            })?;

        self.registry.insert(root.to_path_buf());
        crate::log_event!("watcher", "watching root", "{}", root.display());
        Ok(())
    }

    /// Register a watch on directory `path`.
    ///
    /// Returns `Ok(false)` if the directory is already watched. On backend
    /// failure nothing is recorded.
    pub fn add_watch(&mut self, path: &Path) -> Result<bool, WatchError> {
        if self.registry.contains(path) {
            crate::debug_event!("watcher", "already watched", "{}", path.display());
            return Ok(false);
        }

        self.backend
            .watch(path)
            .map_err(|e| WatchError::PathWatchFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        self.registry.insert(path.to_path_buf());
        crate::log_event!("watcher", "add watch", "{}", path.display());
        Ok(true)
    }

    /// Unregister the watch on directory `path`.
    ///
    /// Returns `Ok(false)` if the directory was not watched. The registration
    /// is dropped even when the backend reports an error; a watch the OS
    /// already discarded (the directory is gone) is not an error.
    pub fn remove_watch(&mut self, path: &Path) -> Result<bool, WatchError> {
        if !self.registry.remove(path) {
            crate::debug_event!("watcher", "not watched", "{}", path.display());
            return Ok(false);
        }

        match self.backend.unwatch(path) {
            Ok(()) => {}
            Err(e) if matches!(e.kind, notify::ErrorKind::WatchNotFound) => {
                crate::debug_event!("watcher", "watch already gone", "{}", path.display());
            }
            Err(e) => {
                return Err(WatchError::PathUnwatchFailed {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        }

        crate::log_event!("watcher", "remove watch", "{}", path.display());
        Ok(true)
    }

    pub fn is_watched(&self, path: &Path) -> bool {
        self.registry.contains(path)
    }

    /// Number of registrations, the root included.
    ///
    /// Matches the number of indexed directories while every watch call
    /// succeeds.
    pub fn watch_count(&self) -> usize {
        self.registry.len()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
