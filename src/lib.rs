//! Live in-memory index of a directory tree, queried over a Unix socket.
//!
//! A notify-backed watcher keeps [`index::PathIndex`] in step with the
//! filesystem through a single [`watcher::IndexMutator`], while
//! [`server::QueryServer`] answers ordered-subsequence queries against it
//! concurrently.

pub mod cli;
pub mod config;
pub mod index;
pub mod logging;
pub mod monitor;
pub mod server;
pub mod walker;
pub mod watcher;

pub use config::Settings;
pub use index::{PathIndex, SharedIndex};
pub use server::QueryServer;
pub use walker::TreeWalker;
pub use watcher::{IndexMutator, WatchError, WatchManager};
