//! Event-driven recursive directory watching.
//!
//! Keeps the path index and the set of watched directories in step with the
//! filesystem.
//!
//! # Architecture
//!
//! ```text
//! notify watcher (NonRecursive, one per directory)
//!         |  notify::Result<Event>  (bounded mpsc)
//!         v
//!   IndexMutator::run            single control loop
//!         |  translate()         Created / Deleted / RenamedIn / RenamedOut
//!         v
//!   IndexMutator::apply  ---> PathIndex (write lock)
//!                        ---> WatchManager (add/remove watch)
//! ```

mod error;
mod manager;
mod mutator;
mod registry;
#[cfg(test)]
mod sequence_tests;
#[cfg(test)]
pub(crate) mod testing;
mod translator;

pub use error::WatchError;
pub use manager::{EventReceiver, WatchBackend, WatchManager, recommended_backend};
pub use mutator::IndexMutator;
pub use registry::WatchRegistry;
pub use translator::{ActionKind, FsAction, translate};
