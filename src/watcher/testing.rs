//! In-memory [`WatchBackend`] for exercising watch bookkeeping without the OS.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::manager::WatchBackend;

/// Backend that records registrations and can be told to fail.
#[derive(Debug, Default, Clone)]
pub struct RecordingBackend {
    active: HashSet<PathBuf>,
    failing: HashSet<PathBuf>,
    watch_calls: usize,
    unwatch_calls: usize,
}

impl RecordingBackend {
    /// Make every `watch` call on `path` fail.
    pub fn fail_on(&mut self, path: &Path) {
        self.failing.insert(path.to_path_buf());
    }

    pub fn is_active(&self, path: &Path) -> bool {
        self.active.contains(path)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn watch_calls(&self) -> usize {
        self.watch_calls
    }

    pub fn unwatch_calls(&self) -> usize {
        self.unwatch_calls
    }
}

impl WatchBackend for RecordingBackend {
    fn watch(&mut self, path: &Path) -> notify::Result<()> {
        self.watch_calls += 1;
        if self.failing.contains(path) {
            return Err(notify::Error::generic("injected watch failure").add_path(path.to_path_buf()));
        }
        self.active.insert(path.to_path_buf());
        Ok(())
    }

    fn unwatch(&mut self, path: &Path) -> notify::Result<()> {
        self.unwatch_calls += 1;
        if self.active.remove(path) {
            Ok(())
        } else {
            Err(notify::Error::watch_not_found().add_path(path.to_path_buf()))
        }
    }
}
