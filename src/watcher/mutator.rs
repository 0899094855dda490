//! The single writer of the path index and the watch set.
//!
//! One task owns an [`IndexMutator`] and feeds it raw events in delivery
//! order, so no two index mutations ever run concurrently. Each action takes
//! the index write lock once; queries observe the index either before or
//! after it, never halfway.

use notify::Event;
use tokio_util::sync::CancellationToken;

use crate::index::{SharedIndex, entry_for};

use super::error::WatchError;
use super::manager::{EventReceiver, WatchBackend, WatchManager};
use super::translator::{FsAction, translate};

/// Applies normalized actions to the index and the watch registrations.
pub struct IndexMutator<B: WatchBackend> {
    index: SharedIndex,
    watches: WatchManager<B>,
}

impl<B: WatchBackend> IndexMutator<B> {
    pub fn new(index: SharedIndex, watches: WatchManager<B>) -> Self {
        Self { index, watches }
    }

    pub fn index(&self) -> &SharedIndex {
        &self.index
    }

    pub fn watches(&self) -> &WatchManager<B> {
        &self.watches
    }

    /// Apply one action.
    ///
    /// Additions replace any equal entry, append the path, then watch it if
    /// it is a directory. Removals unwatch a directory first, then drop its
    /// entry; descendants stay indexed. Watch failures are logged and the
    /// index change still happens.
    pub fn apply(&mut self, action: &FsAction) {
        let entry = entry_for(&action.path);

        if action.kind.is_addition() {
            let replaced = self.index.write().add(entry);
            if replaced {
                crate::debug_event!("index", "replaced", "{}", action.path.display());
            } else {
                crate::log_event!("index", "added", "{}", action.path.display());
            }

            if action.is_dir {
                if let Err(e) = self.watches.add_watch(&action.path) {
                    tracing::error!("[watcher] {e}");
                }
            }
        } else {
            if action.is_dir {
                if let Err(e) = self.watches.remove_watch(&action.path) {
                    tracing::error!("[watcher] {e}");
                }
            }

            if self.index.write().remove(&entry) {
                crate::log_event!("index", "removed", "{}", action.path.display());
            } else {
                crate::debug_event!("index", "not indexed", "{}", action.path.display());
            }
        }
    }

    /// Translate and apply one raw event. Returns how many actions it produced.
    pub fn handle_event(&mut self, result: notify::Result<Event>) -> usize {
        let event = match result {
            Ok(event) => event,
            Err(e) => {
                let err = WatchError::EventError {
                    details: e.to_string(),
                };
                tracing::error!("[watcher] {err}");
                return 0;
            }
        };

        if event.need_rescan() {
            tracing::warn!(
                "[watcher] event queue overflowed, changes may have been missed: {:?}",
                event.paths
            );
        }

        let actions = translate(&event, |path| self.watches.is_watched(path));
        if actions.is_empty() {
            crate::debug_event!("watcher", "ignored", "{:?} {:?}", event.kind, event.paths);
        }

        for action in &actions {
            crate::debug_event!(
                "watcher",
                "action",
                "{:?} {} (dir: {})",
                action.kind,
                action.path.display(),
                action.is_dir
            );
            self.apply(action);
        }

        actions.len()
    }

    /// Run the control loop until the channel closes or `cancel` fires.
    ///
    /// A closed channel means the OS watcher is gone, which is reported as
    /// [`WatchError::ChannelClosed`].
    pub async fn run(
        mut self,
        mut events: EventReceiver,
        cancel: CancellationToken,
    ) -> Result<(), WatchError> {
        crate::log_event!(
            "watcher",
            "started",
            "{} paths indexed, {} directories watched",
            self.index.read().len(),
            self.watches.watch_count()
        );

        loop {
            tokio::select! {
                received = events.recv() => match received {
                    Some(result) => {
                        self.handle_event(result);
                    }
                    None => return Err(WatchError::ChannelClosed),
                },

                _ = cancel.cancelled() => {
                    crate::log_event!("watcher", "stopped");
                    return Ok(());
                }
            }
        }
    }
}
