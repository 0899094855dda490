//! Mutation sequences against the in-memory watch backend.

use std::path::{Path, PathBuf};

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use rand::SeedableRng;
use rand::prelude::*;
use rand::rngs::StdRng;

use super::testing::RecordingBackend;
use super::{ActionKind, FsAction, IndexMutator, WatchManager};
use crate::index::PathIndex;

const ROOT: &str = "/w";

fn mutator_with(backend: RecordingBackend) -> IndexMutator<RecordingBackend> {
    let mut watches = WatchManager::new(backend);
    watches.watch_root(Path::new(ROOT)).unwrap();
    let index = PathIndex::shared();
    index.write().add(ROOT);
    IndexMutator::new(index, watches)
}

fn mutator() -> IndexMutator<RecordingBackend> {
    mutator_with(RecordingBackend::default())
}

fn entries(m: &IndexMutator<RecordingBackend>) -> Vec<String> {
    m.index().read().iter().map(str::to_string).collect()
}

#[test]
fn test_live_set_tracks_action_sequence() {
    // (path, is_dir); a path keeps its kind for the whole run
    let pool: Vec<(PathBuf, bool)> = (0..12)
        .map(|i| (PathBuf::from(format!("{ROOT}/p{i}")), i % 3 == 0))
        .collect();

    let mut m = mutator();
    let mut model: Vec<String> = vec![ROOT.to_string()];
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..500 {
        let (path, is_dir) = &pool[rng.random_range(0..pool.len())];
        let entry = path.to_string_lossy().into_owned();
        let kind = match rng.random_range(0..4) {
            0 => ActionKind::Created,
            1 => ActionKind::RenamedIn,
            2 => ActionKind::Deleted,
            _ => ActionKind::RenamedOut,
        };

        m.apply(&FsAction::new(kind, path.clone(), *is_dir));

        model.retain(|e| e != &entry);
        if kind.is_addition() {
            model.push(entry);
        }

        assert_eq!(entries(&m), model);

        // One registration per indexed directory, the root included
        let live_dirs = 1 + pool
            .iter()
            .filter(|(p, d)| *d && model.contains(&p.to_string_lossy().into_owned()))
            .count();
        assert_eq!(m.watches().watch_count(), live_dirs);
        assert_eq!(m.watches().backend().active_count(), live_dirs);
    }
}

#[test]
fn test_raw_events_drive_index() {
    let mut m = mutator();

    let produced = m.handle_event(Ok(
        Event::new(EventKind::Create(CreateKind::Folder)).add_path(PathBuf::from("/w/c"))
    ));
    assert_eq!(produced, 1);

    m.handle_event(Ok(
        Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("/w/c/d.txt"))
    ));
    assert_eq!(entries(&m), vec!["/w", "/w/c", "/w/c/d.txt"]);
    assert!(m.watches().is_watched(Path::new("/w/c")));

    // Content changes are not structural
    let produced = m.handle_event(Ok(
        Event::new(EventKind::Modify(ModifyKind::Any)).add_path(PathBuf::from("/w/c/d.txt"))
    ));
    assert_eq!(produced, 0);

    m.handle_event(Ok(Event::new(EventKind::Modify(ModifyKind::Name(
        RenameMode::Both,
    )))
    .add_path(PathBuf::from("/w/c/d.txt"))
    .add_path(PathBuf::from("/w/e.txt"))));
    assert_eq!(entries(&m), vec!["/w", "/w/c", "/w/e.txt"]);

    m.handle_event(Ok(
        Event::new(EventKind::Remove(RemoveKind::Folder)).add_path(PathBuf::from("/w/c"))
    ));
    assert_eq!(entries(&m), vec!["/w", "/w/e.txt"]);
    assert!(!m.watches().is_watched(Path::new("/w/c")));
    assert_eq!(m.watches().watch_count(), 1);
}

#[test]
fn test_watcher_errors_leave_index_untouched() {
    let mut m = mutator();
    m.apply(&FsAction::created("/w/keep", false));

    let produced = m.handle_event(Err(notify::Error::generic("backend failure")));

    assert_eq!(produced, 0);
    assert_eq!(entries(&m), vec!["/w", "/w/keep"]);
}

#[test]
fn test_failed_directory_watch_still_indexes() {
    let mut backend = RecordingBackend::default();
    backend.fail_on(Path::new("/w/locked"));
    let mut m = mutator_with(backend);

    m.apply(&FsAction::created("/w/locked", true));

    assert_eq!(entries(&m), vec!["/w", "/w/locked"]);
    assert!(!m.watches().is_watched(Path::new("/w/locked")));

    // Removing it later must not fail on the missing watch
    m.apply(&FsAction::deleted("/w/locked", true));
    assert_eq!(entries(&m), vec!["/w"]);
    assert_eq!(m.watches().backend().unwatch_calls(), 0);
}
