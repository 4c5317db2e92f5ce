use super::{mutator_with, new_mutator};
use crate::codec::{CURRENT_FILE_KEY, FILE_PATH_NAME_KEY};
use crate::error::Error;
use crate::mutator::{DirectorySummary, MoveOutcome, OnConflict, TreeEvent};
use crate::path::EntryPath;
use crate::store::MemoryStore;
use crate::testing::{FailingStore, ScriptedPrompter};
use crate::tree::{Entry, EntryKind, OpenState};
use std::sync::Arc;

fn p(path: &str) -> EntryPath {
    EntryPath::parse(path)
}

fn paths(entries: &[Entry]) -> Vec<String> {
    entries.iter().map(|e| e.path.to_string()).collect()
}

#[tokio::test]
async fn test_create_file_twice() {
    let (store, mut mutator) = new_mutator().await;

    mutator.create_file(&p("a.grace"), "one").await.unwrap();
    let second = mutator.create_file(&p("a.grace"), "two").await;

    assert_eq!(second, Err(Error::ExactDuplicate(p("a.grace"))));
    let contents = store.snapshot().await;
    assert_eq!(contents.len(), 1);
    assert_eq!(contents.get("file:a.grace").map(String::as_str), Some("one"));
    assert_eq!(paths(&mutator.list(&EntryPath::root()).unwrap()), vec!["a.grace"]);
}

#[tokio::test]
async fn test_create_requires_parent() {
    let (store, mut mutator) = new_mutator().await;

    assert_eq!(
        mutator.create_file(&p("missing/a.txt"), "").await,
        Err(Error::NotFound(p("missing")))
    );
    assert_eq!(
        mutator.create_directory(&p("missing/sub")).await,
        Err(Error::NotFound(p("missing")))
    );
    assert!(store.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_create_canonicalizes_and_persists_open() {
    let (store, mut mutator) = new_mutator().await;

    let dir = mutator.create_directory(&p("src")).await.unwrap();
    let file = mutator.create_file(&p("src/main"), "").await.unwrap();

    assert_eq!(file, p("src/main.grace"));
    let contents = store.snapshot().await;
    assert_eq!(contents.get("directory:src").map(String::as_str), Some("open"));
    assert!(contents.contains_key("file:src/main.grace"));
    assert_eq!(
        mutator.tree().entry(EntryKind::Directory, &dir).unwrap().open,
        Some(OpenState::Open)
    );
}

#[tokio::test]
async fn test_move_directory_into_sibling() {
    let (store, mut mutator) = new_mutator().await;
    mutator.create_directory(&p("docs")).await.unwrap();
    mutator.create_file(&p("docs/readme.txt"), "hello").await.unwrap();
    mutator.create_directory(&p("archive")).await.unwrap();

    let outcome = mutator
        .move_directory(&p("docs"), &p("archive"), OnConflict::Fail)
        .await
        .unwrap();

    assert_eq!(outcome, MoveOutcome::Moved(p("archive/docs")));
    let contents = store.snapshot().await;
    assert_eq!(
        contents.get("file:archive/docs/readme.txt").map(String::as_str),
        Some("hello")
    );
    assert!(!contents.contains_key("file:docs/readme.txt"));
    assert!(!contents.contains_key("directory:docs"));
    assert!(contents.contains_key("directory:archive/docs"));
    assert!(mutator.tree().contains(EntryKind::File, &p("archive/docs/readme.txt")));
    assert!(!mutator.tree().contains(EntryKind::Directory, &p("docs")));
}

#[tokio::test]
async fn test_move_directory_rebases_whole_subtree() {
    let (store, mut mutator) = new_mutator().await;
    mutator.create_directory(&p("a")).await.unwrap();
    mutator.create_directory(&p("a/b")).await.unwrap();
    mutator.create_directory(&p("a/b/c")).await.unwrap();
    mutator.create_file(&p("a/one.txt"), "1").await.unwrap();
    mutator.create_file(&p("a/b/c/two.txt"), "2").await.unwrap();
    mutator.create_directory(&p("ab")).await.unwrap();
    mutator.create_file(&p("ab/three.txt"), "3").await.unwrap();
    mutator.create_directory(&p("dest")).await.unwrap();
    mutator
        .set_open_state(&p("a/b"), OpenState::Closed)
        .await
        .unwrap();

    let before: Vec<EntryPath> = mutator
        .tree()
        .descendants(&p("a"))
        .unwrap()
        .iter()
        .filter_map(|e| e.path.rebase(&p("a"), &p("dest/a")))
        .collect();

    _ = mutator
        .move_directory(&p("a"), &p("dest"), OnConflict::Fail)
        .await
        .unwrap();

    let after: Vec<EntryPath> = mutator
        .tree()
        .descendants(&p("dest/a"))
        .unwrap()
        .into_iter()
        .map(|e| e.path)
        .collect();
    assert_eq!(before, after);

    let contents = store.snapshot().await;
    assert_eq!(contents.get("directory:dest/a/b").map(String::as_str), Some("closed"));
    assert_eq!(contents.get("file:dest/a/b/c/two.txt").map(String::as_str), Some("2"));
    // A sibling sharing the name prefix is untouched
    assert_eq!(contents.get("file:ab/three.txt").map(String::as_str), Some("3"));
    assert!(!contents.keys().any(|key| key.contains(":a/") || key.ends_with(":a")));
}

#[tokio::test]
async fn test_selection_follows_directory_move() {
    let (store, mut mutator) = new_mutator().await;
    mutator.create_directory(&p("docs")).await.unwrap();
    mutator.create_directory(&p("arch")).await.unwrap();
    mutator.create_file(&p("docs/r.txt"), "").await.unwrap();
    mutator.select(&p("docs/r.txt")).await.unwrap();

    let outcome = mutator
        .move_directory(&p("docs"), &p("arch"), OnConflict::Fail)
        .await
        .unwrap();

    assert_eq!(outcome, MoveOutcome::Moved(p("arch/docs")));
    assert_eq!(mutator.selection(), Some(&p("arch/docs/r.txt")));
    let contents = store.snapshot().await;
    assert_eq!(contents.get(CURRENT_FILE_KEY).map(String::as_str), Some("arch/docs/r.txt"));
    assert_eq!(contents.get(FILE_PATH_NAME_KEY).map(String::as_str), Some("arch/docs/r.txt"));
}

#[tokio::test]
async fn test_move_keeps_legacy_name() {
    let store = MemoryStore::with_entries([("file:Makefile", "all:"), ("directory:build", "open")]);
    let mut mutator = mutator_with(Arc::new(store.clone()), Arc::new(ScriptedPrompter::new())).await;

    let outcome = mutator
        .move_file(&p("Makefile"), &p("build"), OnConflict::Fail)
        .await
        .unwrap();

    assert_eq!(outcome, MoveOutcome::Moved(p("build/Makefile")));
    assert_eq!(
        store.snapshot().await.get("file:build/Makefile").map(String::as_str),
        Some("all:")
    );
}

#[tokio::test]
async fn test_move_directory_into_itself() {
    let (store, mut mutator) = new_mutator().await;
    mutator.create_directory(&p("a")).await.unwrap();
    mutator.create_directory(&p("a/b")).await.unwrap();
    let before = store.snapshot().await;

    for destination in ["a", "a/b"] {
        let result = mutator
            .move_directory(&p("a"), &p(destination), OnConflict::Prompt)
            .await;
        assert_eq!(
            result,
            Err(Error::SelfOrDescendantMove {
                from: p("a"),
                destination: p(destination),
            })
        );
    }
    assert_eq!(store.snapshot().await, before);
    assert!(mutator.tree().contains(EntryKind::Directory, &p("a/b")));
}

#[tokio::test]
async fn test_move_into_current_parent_is_unchanged() {
    let (store, mut mutator) = new_mutator().await;
    mutator.create_directory(&p("docs")).await.unwrap();
    mutator.create_file(&p("docs/a.txt"), "").await.unwrap();
    let before = store.snapshot().await;

    let outcome = mutator
        .move_file(&p("docs/a.txt"), &p("docs"), OnConflict::Fail)
        .await
        .unwrap();
    assert_eq!(outcome, MoveOutcome::Unchanged);
    let outcome = mutator
        .move_directory(&p("docs"), &EntryPath::root(), OnConflict::Fail)
        .await
        .unwrap();
    assert_eq!(outcome, MoveOutcome::Unchanged);
    assert_eq!(store.snapshot().await, before);
}

#[tokio::test]
async fn test_move_file_conflict_fails() {
    let store = MemoryStore::with_entries([
        ("directory:docs", "open"),
        ("file:docs/a.txt", "inner"),
        ("file:a.txt", "outer"),
    ]);
    let mut mutator = mutator_with(Arc::new(store.clone()), Arc::new(ScriptedPrompter::new())).await;
    let before = store.snapshot().await;

    let result = mutator
        .move_file(&p("docs/a.txt"), &EntryPath::root(), OnConflict::Fail)
        .await;

    assert_eq!(result, Err(Error::ExactDuplicate(p("a.txt"))));
    assert_eq!(store.snapshot().await, before);
    assert!(mutator.tree().contains(EntryKind::File, &p("docs/a.txt")));
}

#[tokio::test]
async fn test_move_file_conflict_prompts() {
    let store = MemoryStore::with_entries([
        ("directory:docs", "open"),
        ("file:docs/a.txt", "inner"),
        ("file:a.txt", "outer"),
        (CURRENT_FILE_KEY, "docs/a.txt"),
    ]);
    let prompter = Arc::new(ScriptedPrompter::new().answer("b"));
    let mut mutator = mutator_with(Arc::new(store.clone()), prompter.clone()).await;

    let outcome = mutator
        .move_file(&p("docs/a.txt"), &EntryPath::root(), OnConflict::Prompt)
        .await
        .unwrap();

    assert_eq!(outcome, MoveOutcome::Moved(p("b.txt")));
    assert_eq!(prompter.name_prompts()[0].title, "Name Conflict: a.txt");
    let contents = store.snapshot().await;
    assert_eq!(contents.get("file:b.txt").map(String::as_str), Some("inner"));
    assert_eq!(contents.get("file:a.txt").map(String::as_str), Some("outer"));
    assert!(!contents.contains_key("file:docs/a.txt"));
    // The selection follows the file
    assert_eq!(mutator.selection(), Some(&p("b.txt")));
    assert_eq!(contents.get(CURRENT_FILE_KEY).map(String::as_str), Some("b.txt"));
    assert_eq!(contents.get(FILE_PATH_NAME_KEY).map(String::as_str), Some("b.txt"));
}

#[tokio::test]
async fn test_move_conflict_cancelled() {
    let store = MemoryStore::with_entries([
        ("directory:docs", "open"),
        ("directory:docs/img", "open"),
        ("directory:img", ""),
    ]);
    let prompter = Arc::new(ScriptedPrompter::new().cancel());
    let mut mutator = mutator_with(Arc::new(store.clone()), prompter).await;
    let before = store.snapshot().await;

    let outcome = mutator
        .move_directory(&p("img"), &p("docs"), OnConflict::Prompt)
        .await
        .unwrap();

    assert_eq!(outcome, MoveOutcome::Cancelled);
    assert_eq!(store.snapshot().await, before);
}

#[tokio::test]
async fn test_rename_file() {
    let (store, mut mutator) = new_mutator().await;
    mutator.create_directory(&p("docs")).await.unwrap();
    mutator.create_file(&p("docs/draft.txt"), "text").await.unwrap();
    mutator.create_file(&p("taken.txt"), "").await.unwrap();
    mutator.select(&p("docs/draft.txt")).await.unwrap();

    // Global uniqueness applies to renames
    assert_eq!(
        mutator
            .rename(EntryKind::File, &p("docs/draft.txt"), "taken.txt")
            .await,
        Err(Error::GlobalNameCollision {
            name: "taken.txt".to_string(),
            existing: p("taken.txt"),
        })
    );

    let renamed = mutator
        .rename(EntryKind::File, &p("docs/draft.txt"), "final")
        .await
        .unwrap();
    assert_eq!(renamed, p("docs/final.grace"));
    assert_eq!(mutator.selection(), Some(&renamed));

    let contents = store.snapshot().await;
    assert_eq!(contents.get("file:docs/final.grace").map(String::as_str), Some("text"));
    assert!(!contents.contains_key("file:docs/draft.txt"));
}

#[tokio::test]
async fn test_rename_to_own_canonical_name() {
    let (store, mut mutator) = new_mutator().await;
    mutator.create_file(&p("a.grace"), "x").await.unwrap();
    let before = store.snapshot().await;

    let renamed = mutator
        .rename(EntryKind::File, &p("a.grace"), "a")
        .await
        .unwrap();

    assert_eq!(renamed, p("a.grace"));
    assert_eq!(store.snapshot().await, before);
}

#[tokio::test]
async fn test_rename_directory_keeps_order() {
    let (_store, mut mutator) = new_mutator().await;
    mutator.create_directory(&p("b")).await.unwrap();
    mutator.create_directory(&p("c")).await.unwrap();
    mutator.create_file(&p("c/x.txt"), "").await.unwrap();
    mutator.create_file(&p("a.txt"), "").await.unwrap();

    mutator.rename(EntryKind::Directory, &p("c"), "a").await.unwrap();

    assert_eq!(
        paths(&mutator.list(&EntryPath::root()).unwrap()),
        vec!["a", "a.txt", "b"]
    );
    assert!(mutator.tree().contains(EntryKind::File, &p("a/x.txt")));
}

#[tokio::test]
async fn test_reserved_name_needs_confirmation() {
    let store = MemoryStore::new();
    let prompter = Arc::new(ScriptedPrompter::new().confirm(false).confirm(true));
    let mut mutator = mutator_with(Arc::new(store.clone()), prompter.clone()).await;

    assert_eq!(
        mutator.create_file(&p("math"), "").await,
        Err(Error::ReservedName("math".to_string()))
    );
    assert!(store.snapshot().await.is_empty());

    mutator.create_file(&p("math"), "").await.unwrap();
    assert!(store.snapshot().await.contains_key("file:math.grace"));
    assert_eq!(prompter.confirmation_prompts().len(), 2);

    // Directories never ask
    mutator.create_directory(&p("turtle")).await.unwrap();
    assert_eq!(prompter.confirmation_prompts().len(), 2);
}

#[tokio::test]
async fn test_delete_directory_removes_exactly_subtree() {
    let (store, mut mutator) = new_mutator().await;
    mutator.create_directory(&p("docs")).await.unwrap();
    mutator.create_directory(&p("docs/sub")).await.unwrap();
    mutator.create_file(&p("docs/sub/a.txt"), "").await.unwrap();
    mutator.create_file(&p("docs/b.txt"), "").await.unwrap();
    mutator.create_directory(&p("docs2")).await.unwrap();
    mutator.create_file(&p("docs2/c.txt"), "").await.unwrap();
    mutator.select(&p("docs/sub/a.txt")).await.unwrap();

    let removed = mutator.delete_directory(&p("docs")).await.unwrap();

    assert_eq!(removed, 4);
    let contents = store.snapshot().await;
    let keys: Vec<&str> = contents.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["directory:docs2", "file:docs2/c.txt"]);
    assert_eq!(mutator.selection(), None);
    assert_eq!(paths(&mutator.list(&EntryPath::root()).unwrap()), vec!["docs2"]);
}

#[tokio::test]
async fn test_delete_file_clears_selection() {
    let (store, mut mutator) = new_mutator().await;
    mutator.create_file(&p("a.txt"), "").await.unwrap();
    mutator.create_file(&p("b.txt"), "").await.unwrap();
    mutator.select(&p("a.txt")).await.unwrap();

    mutator.delete_file(&p("b.txt")).await.unwrap();
    assert_eq!(mutator.selection(), Some(&p("a.txt")));

    mutator.delete_file(&p("a.txt")).await.unwrap();
    assert_eq!(mutator.selection(), None);
    assert!(store.snapshot().await.is_empty());

    assert_eq!(
        mutator.delete_file(&p("a.txt")).await,
        Err(Error::NotFound(p("a.txt")))
    );
}

#[tokio::test]
async fn test_failed_directory_move_rolls_back() {
    let inner = MemoryStore::with_entries([
        ("directory:docs", "open"),
        ("file:docs/a.txt", "a"),
        ("file:docs/b.txt", "b"),
        ("directory:archive", "closed"),
    ]);
    let before = inner.snapshot().await;
    let store = Arc::new(FailingStore::new(inner.clone()).fail_after_writes(4));
    let mut mutator = mutator_with(store, Arc::new(ScriptedPrompter::new())).await;

    let result = mutator
        .move_directory(&p("docs"), &p("archive"), OnConflict::Fail)
        .await;

    assert!(matches!(result, Err(Error::Store(_))));
    assert_eq!(inner.snapshot().await, before);
    assert!(mutator.tree().contains(EntryKind::File, &p("docs/a.txt")));
    assert!(!mutator.tree().contains(EntryKind::Directory, &p("archive/docs")));
}

#[tokio::test]
async fn test_load_repairs_missing_ancestors() {
    let store = MemoryStore::with_entries([
        ("file:a/b/c.txt", "c"),
        ("directory:x", "closed"),
        (CURRENT_FILE_KEY, "gone.txt"),
        (FILE_PATH_NAME_KEY, "gone.txt"),
    ]);
    let mutator = mutator_with(Arc::new(store.clone()), Arc::new(ScriptedPrompter::new())).await;

    let contents = store.snapshot().await;
    assert_eq!(contents.get("directory:a").map(String::as_str), Some("open"));
    assert_eq!(contents.get("directory:a/b").map(String::as_str), Some("open"));
    assert!(!contents.contains_key(CURRENT_FILE_KEY));
    assert_eq!(mutator.selection(), None);

    let walked = paths(&mutator.tree().walk());
    assert_eq!(walked, vec!["a", "a/b", "a/b/c.txt", "x"]);
    assert_eq!(
        mutator.tree().entry(EntryKind::Directory, &p("x")).unwrap().open,
        Some(OpenState::Closed)
    );
}

#[tokio::test]
async fn test_load_restores_selection() {
    let store = MemoryStore::with_entries([("file:main.grace", ""), (CURRENT_FILE_KEY, "main.grace")]);
    let mutator = mutator_with(Arc::new(store), Arc::new(ScriptedPrompter::new())).await;
    assert_eq!(mutator.selection(), Some(&p("main.grace")));
}

#[tokio::test]
async fn test_toggle_and_summary() {
    let (store, mut mutator) = new_mutator().await;
    mutator.create_directory(&p("d")).await.unwrap();
    assert_eq!(mutator.summary(&p("d")).await.unwrap(), DirectorySummary::Empty);

    assert_eq!(mutator.toggle(&p("d")).await.unwrap(), OpenState::Closed);
    assert_eq!(
        store.snapshot().await.get("directory:d").map(String::as_str),
        Some("closed")
    );
    assert_eq!(mutator.toggle(&p("d")).await.unwrap(), OpenState::Open);

    mutator.create_directory(&p("d/e")).await.unwrap();
    assert_eq!(
        mutator.summary(&p("d")).await.unwrap(),
        DirectorySummary::DirectoriesOnly
    );
    mutator.create_file(&p("d/e/f.txt"), "").await.unwrap();
    let summary = mutator.summary(&p("d")).await.unwrap();
    assert_eq!(summary, DirectorySummary::FilesAndDirectories);
    assert!(
        summary
            .confirmation_message(&p("d"))
            .unwrap()
            .starts_with("\"d\" contains files and sub-directories")
    );
}

#[tokio::test]
async fn test_events_published() {
    let (_store, mut mutator) = new_mutator().await;
    let mut events = mutator.subscribe();

    mutator.create_directory(&p("d")).await.unwrap();
    mutator.create_file(&p("a.txt"), "").await.unwrap();
    _ = mutator
        .move_file(&p("a.txt"), &p("d"), OnConflict::Fail)
        .await
        .unwrap();
    _ = mutator.toggle(&p("d")).await.unwrap();
    _ = mutator.delete_directory(&p("d")).await.unwrap();

    assert_eq!(
        events.try_recv().unwrap(),
        TreeEvent::Created(Entry::directory(p("d"), OpenState::Open))
    );
    assert_eq!(events.try_recv().unwrap(), TreeEvent::Created(Entry::file(p("a.txt"))));
    assert_eq!(
        events.try_recv().unwrap(),
        TreeEvent::Moved {
            kind: EntryKind::File,
            from: p("a.txt"),
            to: p("d/a.txt"),
        }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        TreeEvent::Toggled {
            path: p("d"),
            open: OpenState::Closed,
        }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        TreeEvent::Deleted {
            kind: EntryKind::Directory,
            path: p("d"),
            removed: 2,
        }
    );
    assert!(events.try_recv().is_err());
}
