use crate::classify::ContentKind;
use crate::codec::CURRENT_FILE_KEY;
use crate::config::WorkspaceConfig;
use crate::error::Error;
use crate::path::EntryPath;
use crate::prompt::{DeclineAll, Prompter};
use crate::store::MemoryStore;
use crate::testing::ScriptedPrompter;
use crate::tree::EntryKind;
use crate::workspace::{Upload, Workspace};
use std::sync::{Arc, Mutex};

fn p(path: &str) -> EntryPath {
    EntryPath::parse(path)
}

async fn open(store: &MemoryStore, prompter: Arc<dyn Prompter>) -> Workspace {
    Workspace::open(Arc::new(store.clone()), &WorkspaceConfig::default(), prompter)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_seeds_welcome_file() {
    let store = MemoryStore::new();
    let workspace = open(&store, Arc::new(DeclineAll)).await;

    assert_eq!(workspace.current(), Some(&p("Welcome.grace")));
    let contents = store.snapshot().await;
    assert!(contents.contains_key("file:Welcome.grace"));
    assert_eq!(contents.get(CURRENT_FILE_KEY).map(String::as_str), Some("Welcome.grace"));

    // Reopening restores instead of seeding again
    let mut workspace = open(&store, Arc::new(DeclineAll)).await;
    assert_eq!(workspace.current(), Some(&p("Welcome.grace")));
    workspace.remove().await.unwrap();
    workspace
        .mutator_mut()
        .create_file(&p("mine.grace"), "")
        .await
        .unwrap();
    let workspace = open(&store, Arc::new(DeclineAll)).await;
    assert!(!workspace.has_file(&p("Welcome.grace")));
    assert_eq!(workspace.current(), None);
}

#[tokio::test]
async fn test_no_welcome_when_disabled() {
    let store = MemoryStore::new();
    let config = WorkspaceConfig {
        welcome_file: String::new(),
        ..WorkspaceConfig::default()
    };
    let workspace = Workspace::open(Arc::new(store.clone()), &config, Arc::new(DeclineAll))
        .await
        .unwrap();
    assert!(workspace.tree().is_empty());
    assert!(store.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_open_save_and_change_detection() {
    let store = MemoryStore::with_entries([("file:main.grace", "print 1")]);
    let mut workspace = open(&store, Arc::new(DeclineAll)).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    workspace.on_open(move |opened| {
        recorder.lock().unwrap().push(opened.path.to_string());
    });

    let opened = workspace.open_file(&p("main.grace")).await.unwrap();
    assert_eq!(opened.content, "print 1");
    assert_eq!(opened.kind, ContentKind::Text);
    assert_eq!(*seen.lock().unwrap(), vec!["main.grace".to_string()]);

    assert!(!workspace.is_changed(&p("main.grace"), "print 1").await.unwrap());
    workspace.save("print 2").await.unwrap();
    assert!(workspace.is_changed(&p("main.grace"), "print 1").await.unwrap());
    assert_eq!(workspace.contents(&p("main.grace")).await.unwrap(), "print 2");

    assert_eq!(
        workspace.open_file(&p("nope.grace")).await,
        Err(Error::NotFound(p("nope.grace")))
    );
    assert_eq!(
        workspace.is_changed(&p("nope.grace"), "").await,
        Err(Error::NotFound(p("nope.grace")))
    );
}

#[tokio::test]
async fn test_rename_and_remove_current() {
    let store = MemoryStore::with_entries([("file:draft.txt", "x"), (CURRENT_FILE_KEY, "draft.txt")]);
    let mut workspace = open(&store, Arc::new(DeclineAll)).await;

    let renamed = workspace.rename("final").await.unwrap();
    assert_eq!(renamed, p("final.grace"));
    assert_eq!(workspace.current(), Some(&renamed));

    workspace.remove().await.unwrap();
    assert_eq!(workspace.current(), None);
    assert_eq!(workspace.save("lost").await, Err(Error::NoCurrentFile));
    assert_eq!(workspace.rename("again").await, Err(Error::NoCurrentFile));
    assert_eq!(workspace.remove().await, Err(Error::NoCurrentFile));
}

#[tokio::test]
async fn test_upload_batch() {
    let store = MemoryStore::with_entries([("directory:assets", "open"), ("file:assets/logo.png", "old")]);
    let prompter = Arc::new(ScriptedPrompter::new().answer("logo2").cancel());
    let mut workspace = open(&store, prompter.clone()).await;

    let report = workspace
        .upload(
            vec![
                Upload::new("logo.png", vec![1u8, 2, 3]),
                Upload::new("notes", "remember"),
                Upload::new("logo.png", vec![4u8]),
            ],
            &p("assets"),
        )
        .await
        .unwrap();

    assert_eq!(report.written, vec![p("assets/logo2.png"), p("assets/notes.grace")]);
    assert_eq!(report.skipped, vec!["logo.png".to_string()]);
    assert!(report.failed.is_empty());
    assert_eq!(prompter.name_prompts().len(), 2);

    let contents = store.snapshot().await;
    assert_eq!(
        contents.get("file:assets/logo2.png").map(String::as_str),
        Some("data:image/png;base64,AQID")
    );
    assert_eq!(
        contents.get("file:assets/notes.grace").map(String::as_str),
        Some("remember")
    );
    assert_eq!(
        workspace.read_bytes(&p("assets/logo2.png")).await.unwrap(),
        vec![1, 2, 3]
    );
    // The last written file is opened
    assert_eq!(workspace.current(), Some(&p("assets/notes.grace")));
}

#[tokio::test]
async fn test_upload_explains_rejected_name() {
    let store = MemoryStore::with_entries([("file:keep.txt", "")]);
    let prompter = Arc::new(ScriptedPrompter::new().answer("photo.png"));
    let mut workspace = open(&store, prompter.clone()).await;

    let report = workspace
        .upload(vec![Upload::new("photo.exe", vec![7u8])], &EntryPath::root())
        .await
        .unwrap();

    assert_eq!(report.written, vec![p("photo.png")]);
    let prompts = prompter.name_prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(
        prompts[0].error.as_deref(),
        Some("\"exe\" is not a supported extension.")
    );
}

#[tokio::test]
async fn test_upload_reports_bad_text() {
    let store = MemoryStore::with_entries([("file:keep.txt", "")]);
    let mut workspace = open(&store, Arc::new(DeclineAll)).await;

    let report = workspace
        .upload(vec![Upload::new("bad.txt", vec![0xffu8, 0xfe])], &EntryPath::root())
        .await
        .unwrap();

    assert!(report.written.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "bad.txt");
    assert!(!workspace.has_file(&p("bad.txt")));
}

#[tokio::test]
async fn test_delete_directory_confirmation() {
    let store = MemoryStore::with_entries([
        ("directory:docs", "open"),
        ("file:docs/a.txt", ""),
        ("directory:empty", "open"),
        ("file:keep.txt", ""),
    ]);
    let prompter = Arc::new(ScriptedPrompter::new().confirm(false).confirm(true));
    let mut workspace = open(&store, prompter.clone()).await;

    // Empty directories go without asking
    assert_eq!(workspace.delete_directory(&p("empty")).await.unwrap(), Some(1));
    assert!(prompter.confirmation_prompts().is_empty());

    assert_eq!(workspace.delete_directory(&p("docs")).await.unwrap(), None);
    assert!(workspace.has_file(&p("docs/a.txt")));
    assert_eq!(
        prompter.confirmation_prompts()[0],
        "\"docs\" contains files, which will also be deleted. Are you sure you want to continue?"
    );

    assert_eq!(workspace.delete_directory(&p("docs")).await.unwrap(), Some(2));
    assert!(!workspace.has_file(&p("docs/a.txt")));
}

#[tokio::test]
async fn test_search_follows_mutations() {
    let store = MemoryStore::with_entries([
        ("directory:docs", "open"),
        ("file:docs/readme.txt", ""),
        ("file:notes.txt", ""),
    ]);
    let mut workspace = open(&store, Arc::new(DeclineAll)).await;

    _ = workspace.search("read");
    assert!(workspace.visible(EntryKind::Directory, &p("docs")));
    assert!(workspace.visible(EntryKind::File, &p("docs/readme.txt")));
    assert!(!workspace.visible(EntryKind::File, &p("notes.txt")));

    workspace
        .mutator_mut()
        .create_file(&p("reading.txt"), "")
        .await
        .unwrap();
    assert!(workspace.visible(EntryKind::File, &p("reading.txt")));

    workspace.clear_search();
    assert!(workspace.visible(EntryKind::File, &p("notes.txt")));
}

#[tokio::test]
async fn test_export_directory() {
    let store = MemoryStore::with_entries([
        ("directory:site", "open"),
        ("directory:site/img", "open"),
        ("file:site/index.html", "<p>hi</p>"),
        ("file:site/img/dot.png", "data:image/png;base64,AQID"),
        ("file:other.txt", ""),
    ]);
    let workspace = open(&store, Arc::new(DeclineAll)).await;
    let host = tempfile::tempdir().unwrap();

    let written = workspace
        .export_directory(&p("site"), host.path())
        .await
        .unwrap();

    assert_eq!(written, 2);
    let root = host.path().join("site");
    assert_eq!(std::fs::read_to_string(root.join("index.html")).unwrap(), "<p>hi</p>");
    assert_eq!(std::fs::read(root.join("img").join("dot.png")).unwrap(), vec![1, 2, 3]);
    assert!(!host.path().join("other.txt").exists());

    assert_eq!(
        workspace.export_directory(&p("other.txt"), host.path()).await,
        Err(Error::NotADirectory(p("other.txt")))
    );
}
