//! In-memory index of known filesystem paths.
//!
//! [`PathIndex`] is an insertion-ordered set: membership and removal by
//! equality are O(1) lookups, and iteration order (which is also query result
//! order) is the order paths were added. It has no locking of its own;
//! [`SharedIndex`] wraps it for the one-writer, many-readers setup used by the
//! mutator and the query server.

pub mod matcher;

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexSet;
use parking_lot::RwLock;

pub use matcher::is_subsequence;

/// Index shared between the mutator (writer) and query handlers (readers).
pub type SharedIndex = Arc<RwLock<PathIndex>>;

/// Ordered collection of known paths, each present at most once.
#[derive(Debug, Default, Clone)]
pub struct PathIndex {
    entries: IndexSet<String>,
}

impl PathIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a fresh empty index for sharing.
    pub fn shared() -> SharedIndex {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Add `path` at the end of the index.
    ///
    /// An existing equal entry is removed first, so re-adding a path moves it
    /// to the end instead of duplicating it. Returns `true` if the path was
    /// already present.
    pub fn add(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        let replaced = self.entries.shift_remove(&path);
        self.entries.insert(path);
        replaced
    }

    /// Remove the entry equal to `path`. Returns `false` if it was not there.
    pub fn remove(&mut self, path: &str) -> bool {
        self.entries.shift_remove(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Collect every entry matching `pattern` as an ordered subsequence.
    ///
    /// Results follow index order. The empty pattern returns every entry.
    pub fn search(&self, pattern: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| is_subsequence(pattern, entry))
            .cloned()
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for PathIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut index = Self::new();
        for path in iter {
            index.add(path);
        }
        index
    }
}

/// Convert an OS path to the string form stored in the index.
///
/// Non-UTF-8 bytes are replaced; every producer of entries goes through this
/// function so lookups for the same OS path always agree.
pub fn entry_for(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PathIndex {
        ["/a/foo.txt", "/a/bar.log", "/a/b/baz.txt"]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_search_scenarios() {
        let index = sample();

        assert_eq!(index.search("foo"), vec!["/a/foo.txt"]);
        assert_eq!(index.search("ba"), vec!["/a/bar.log", "/a/b/baz.txt"]);
        assert_eq!(
            index.search(""),
            vec!["/a/foo.txt", "/a/bar.log", "/a/b/baz.txt"]
        );
        assert!(index.search("zzz").is_empty());
    }

    #[test]
    fn test_add_replaces_existing_entry() {
        let mut index = sample();

        assert!(index.add("/a/foo.txt"));
        assert_eq!(index.len(), 3);
        // Re-added entry moves to the end
        assert_eq!(
            index.iter().collect::<Vec<_>>(),
            vec!["/a/bar.log", "/a/b/baz.txt", "/a/foo.txt"]
        );
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut index = sample();

        assert!(index.remove("/a/bar.log"));
        assert!(!index.remove("/a/bar.log"));
        assert_eq!(index.len(), 2);
        assert!(!index.contains("/a/bar.log"));
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut index = sample();
        index.remove("/a/foo.txt");
        assert_eq!(
            index.iter().collect::<Vec<_>>(),
            vec!["/a/bar.log", "/a/b/baz.txt"]
        );
    }

    #[test]
    fn test_entry_for_roundtrip() {
        assert_eq!(entry_for(Path::new("/a/b/c.txt")), "/a/b/c.txt");
    }
}
