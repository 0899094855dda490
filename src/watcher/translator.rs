//! Raw notify events to normalized index actions.
//!
//! Every path carried by an event is classified on its own, and one event may
//! yield several actions (a paired rename yields an outgoing and an incoming
//! one). Duplicated actions are harmless downstream: an addition replaces an
//! existing entry and a removal of an absent entry is a no-op.

use std::path::{Path, PathBuf};

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};

/// What happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Created,
    Deleted,
    /// Moved into a watched directory. Handled like `Created`.
    RenamedIn,
    /// Moved out of a watched directory. Handled like `Deleted`.
    RenamedOut,
}

impl ActionKind {
    /// Whether the action puts a path into the index.
    pub fn is_addition(self) -> bool {
        matches!(self, ActionKind::Created | ActionKind::RenamedIn)
    }
}

/// A normalized filesystem change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsAction {
    pub kind: ActionKind,
    pub path: PathBuf,
    pub is_dir: bool,
}

impl FsAction {
    pub fn new(kind: ActionKind, path: impl Into<PathBuf>, is_dir: bool) -> Self {
        Self {
            kind,
            path: path.into(),
            is_dir,
        }
    }

    pub fn created(path: impl Into<PathBuf>, is_dir: bool) -> Self {
        Self::new(ActionKind::Created, path, is_dir)
    }

    pub fn deleted(path: impl Into<PathBuf>, is_dir: bool) -> Self {
        Self::new(ActionKind::Deleted, path, is_dir)
    }
}

/// Directory hint carried by the event kind, if any.
#[derive(Debug, Clone, Copy)]
enum DirHint {
    Dir,
    File,
    Unknown,
}

impl From<CreateKind> for DirHint {
    fn from(kind: CreateKind) -> Self {
        match kind {
            CreateKind::Folder => DirHint::Dir,
            CreateKind::File => DirHint::File,
            _ => DirHint::Unknown,
        }
    }
}

impl From<RemoveKind> for DirHint {
    fn from(kind: RemoveKind) -> Self {
        match kind {
            RemoveKind::Folder => DirHint::Dir,
            RemoveKind::File => DirHint::File,
            _ => DirHint::Unknown,
        }
    }
}

/// Classify a raw event into zero or more actions.
///
/// `is_known_dir` answers whether a path that may no longer exist on disk was
/// a directory; the mutator passes its watch registry. Incoming paths without
/// a kind hint are probed on disk.
pub fn translate(event: &Event, is_known_dir: impl Fn(&Path) -> bool) -> Vec<FsAction> {
    let incoming = |path: &PathBuf, kind: ActionKind, hint: DirHint| {
        let is_dir = match hint {
            DirHint::Dir => true,
            DirHint::File => false,
            DirHint::Unknown => is_dir_on_disk(path),
        };
        FsAction::new(kind, path.clone(), is_dir)
    };
    let outgoing = |path: &PathBuf, kind: ActionKind, hint: DirHint| {
        // A known watched directory is always treated as one so its watch
        // gets released
        let is_dir = matches!(hint, DirHint::Dir) || is_known_dir(path);
        FsAction::new(kind, path.clone(), is_dir)
    };

    match event.kind {
        EventKind::Create(kind) => event
            .paths
            .iter()
            .map(|p| incoming(p, ActionKind::Created, kind.into()))
            .collect(),

        EventKind::Remove(kind) => event
            .paths
            .iter()
            .map(|p| outgoing(p, ActionKind::Deleted, kind.into()))
            .collect(),

        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::To => event
                .paths
                .iter()
                .map(|p| incoming(p, ActionKind::RenamedIn, DirHint::Unknown))
                .collect(),

            RenameMode::From => event
                .paths
                .iter()
                .map(|p| outgoing(p, ActionKind::RenamedOut, DirHint::Unknown))
                .collect(),

            // notify reports the pair as [from, to]
            RenameMode::Both => match event.paths.as_slice() {
                [from, to] => vec![
                    outgoing(from, ActionKind::RenamedOut, DirHint::Unknown),
                    incoming(to, ActionKind::RenamedIn, DirHint::Unknown),
                ],
                _ => Vec::new(),
            },

            // Direction unknown: decide by whether the path is still there
            RenameMode::Any | RenameMode::Other => event
                .paths
                .iter()
                .map(|p| {
                    if p.symlink_metadata().is_ok() {
                        incoming(p, ActionKind::RenamedIn, DirHint::Unknown)
                    } else {
                        outgoing(p, ActionKind::RenamedOut, DirHint::Unknown)
                    }
                })
                .collect(),
        },

        _ => Vec::new(),
    }
}

fn is_dir_on_disk(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| m.is_dir())
}
