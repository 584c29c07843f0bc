//! End-to-end session tests over the in-memory backend.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::fs;

use taskdeck_app::{
    EditorError, MemoryBackend, MemoryCategoryService, MemoryTaskService, Notification, SeedData,
    TaskDataService, TaskSession,
};
use taskdeck_core::id::TaskId;
use taskdeck_core::{CategoryDraft, Priority, StatusFilter, TaskStats, resolve_category};
use tempfile::TempDir;
use time::UtcOffset;
use time::macros::{datetime, offset};

const SEED: &str = r#"{
  "tasks": [
    {"id": "00000000-0000-0000-0000-000000000001", "title": "A", "completed": false, "dueDate": "2020-01-01", "category": "Work", "createdAt": "2019-12-01T00:00:00Z"},
    {"id": "00000000-0000-0000-0000-000000000002", "title": "B", "completed": true, "category": "Gone", "createdAt": "2019-12-02T00:00:00Z"}
  ],
  "categories": [
    {"id": "00000000-0000-0000-0000-0000000000aa", "name": "Work", "tags": ["office"], "createdOn": "2019-11-01T00:00:00Z"}
  ]
}"#;

type Session = TaskSession<MemoryTaskService, MemoryCategoryService>;

fn fixed_task_id(n: u8) -> TaskId {
    format!("00000000-0000-0000-0000-0000000000{n:02}")
        .parse()
        .expect("must parse task id")
}

async fn seeded_session() -> (TempDir, MemoryBackend, Session) {
    seeded_session_at(SEED, UtcOffset::UTC).await
}

async fn seeded_session_at(seed: &str, offset: UtcOffset) -> (TempDir, MemoryBackend, Session) {
    let dir = TempDir::with_prefix("taskdeck-session-").expect("create temp dir");
    let path = dir.path().join("tasks.json");
    fs::write(&path, seed).expect("write seed");

    let backend = MemoryBackend::from_seed(SeedData::load(&path, offset).expect("load seed"));
    let mut session = TaskSession::new(backend.task_service(), backend.category_service())
        .with_utc_offset(offset);
    session.load().await;
    (dir, backend, session)
}

#[tokio::test]
async fn two_task_store_matches_documented_scenarios() {
    let (_dir, _backend, mut session) = seeded_session().await;

    assert_eq!(
        session.stats_at(datetime!(2025-01-01 12:00 UTC)),
        TaskStats {
            total: 2,
            completed: 1,
            pending: 1,
            overdue: 1,
        }
    );

    session.set_status_filter(StatusFilter::Pending);
    session.set_query("a");
    let visible: Vec<TaskId> = session.visible().iter().map(|task| task.id).collect();
    assert_eq!(visible, vec![fixed_task_id(1)]);
}

#[tokio::test]
async fn create_edit_toggle_delete_round_trip() {
    let (_dir, backend, mut session) = seeded_session().await;

    session.begin_create().unwrap();
    {
        let form = session.form_mut().unwrap();
        form.title = "  Buy milk ".into();
        form.due_date = "2025-02-01".into();
        form.priority = Priority::High;
        form.add_tag("x");
        form.add_tag(" x ");
        form.add_tag("y");
    }
    let note = session.submit().await.unwrap();
    assert_eq!(note, Notification::Success("Task created successfully!".into()));

    let created = session
        .snapshot()
        .iter()
        .find(|task| task.title == "Buy milk")
        .cloned()
        .expect("created task is in the store");
    assert_eq!(created.tags, vec!["x", "y"]);
    assert_eq!(session.snapshot().len(), 3);
    assert!(!session.editor().is_open());

    session.begin_edit(created.id).unwrap();
    session.form_mut().unwrap().description = "2 litres".into();
    let note = session.submit().await.unwrap();
    assert_eq!(note.message(), "Task updated successfully!");
    let edited = session.task(created.id).expect("edited task").clone();
    assert_eq!(edited.description, "2 litres");
    assert_eq!(edited.created_at, created.created_at);
    assert_eq!(edited.priority, Priority::High);

    assert_eq!(session.toggle_complete(created.id).await.message(), "Task completed!");
    let stored = backend
        .task_service()
        .get_by_id(created.id)
        .await
        .expect("backend holds the task");
    assert!(stored.completed);
    assert_eq!(stored.title, "Buy milk");

    assert_eq!(
        session.delete(created.id).await.message(),
        "Task deleted successfully!"
    );
    assert!(session.task(created.id).is_none());
    assert_eq!(backend.task_service().get_all().await.len(), 2);
}

#[tokio::test]
async fn deleting_unknown_task_reports_failure_and_keeps_store() {
    let (_dir, _backend, mut session) = seeded_session().await;
    let before = session.snapshot();

    let note = session.delete(TaskId::new()).await;
    assert_eq!(note, Notification::Error("Failed to delete task".into()));
    assert_eq!(&*before, &*session.snapshot());
}

#[tokio::test]
async fn editing_unknown_task_is_rejected() {
    let (_dir, _backend, mut session) = seeded_session().await;
    let missing = TaskId::new();
    assert!(matches!(
        session.begin_edit(missing),
        Err(EditorError::UnknownTask(id)) if id == missing
    ));
    assert!(matches!(session.submit().await, Err(EditorError::NotEditing)));
}

#[tokio::test]
async fn categories_resolve_by_name_and_tolerate_dangling_labels() {
    let (_dir, _backend, mut session) = seeded_session().await;

    let first = session.task(fixed_task_id(1)).expect("seeded task").clone();
    let second = session.task(fixed_task_id(2)).expect("seeded task").clone();
    assert_eq!(
        resolve_category(&first, session.categories()).map(|c| c.name.as_str()),
        Some("Work")
    );
    assert!(resolve_category(&second, session.categories()).is_none());

    let note = session
        .create_category(CategoryDraft {
            name: "Gone".into(),
            tags: Vec::new(),
        })
        .await;
    assert!(!note.is_error());
    assert_eq!(session.categories().len(), 2);
    assert!(resolve_category(&second, session.categories()).is_some());
}

#[tokio::test]
async fn cancel_leaves_store_untouched() {
    let (_dir, _backend, mut session) = seeded_session().await;
    let before = session.snapshot();

    session.begin_edit(fixed_task_id(1)).unwrap();
    session.form_mut().unwrap().title = "Never saved".into();
    session.cancel().unwrap();

    assert_eq!(&*before, &*session.snapshot());
    assert!(!session.editor().is_open());
}

#[tokio::test]
async fn date_only_due_dates_keep_their_day_west_of_utc() {
    let seed = r#"{"tasks": [
        {"id": "00000000-0000-0000-0000-000000000001", "title": "Seeded", "dueDate": "2025-01-10"}
    ]}"#;
    let (_dir, _backend, mut session) = seeded_session_at(seed, offset!(-5)).await;

    session.begin_create().unwrap();
    {
        let form = session.form_mut().unwrap();
        form.title = "Typed".into();
        form.due_date = "2025-01-10".into();
    }
    assert!(!session.submit().await.unwrap().is_error());

    let due_day = datetime!(2025-01-10 12:00 -05:00);
    let stats = session.stats_at(due_day);
    assert_eq!((stats.pending, stats.overdue), (2, 0));

    let next_day = datetime!(2025-01-11 08:00 -05:00);
    assert_eq!(session.stats_at(next_day).overdue, 2);

    session.begin_edit(fixed_task_id(1)).unwrap();
    assert_eq!(session.form_mut().unwrap().due_date, "2025-01-10");
}
