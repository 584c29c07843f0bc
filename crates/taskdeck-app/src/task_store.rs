//! Session-local task collection with copy-on-write snapshots.

use std::sync::Arc;

use taskdeck_core::Task;
use taskdeck_core::id::TaskId;
use tracing::debug;

/// Immutable view of the task collection at one point in time.
pub type TaskSnapshot = Arc<[Task]>;

/// Authoritative task collection for the current session.
///
/// Every mutation builds a fresh slice, so snapshots handed out earlier
/// never change underneath their holders.
#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: TaskSnapshot,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self {
            tasks: Arc::from(Vec::new()),
        }
    }
}

impl TaskStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection (initial load).
    pub fn load(&mut self, tasks: Vec<Task>) -> TaskSnapshot {
        debug!(count = tasks.len(), "Loaded task store");
        self.tasks = Arc::from(tasks);
        self.snapshot()
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> TaskSnapshot {
        Arc::clone(&self.tasks)
    }

    /// Borrow the current tasks in store order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Look up a task by id.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Number of tasks held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true when no tasks are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Append a task that already carries its id. Uniqueness is the caller's job.
    pub fn apply_create(&mut self, task: Task) -> TaskSnapshot {
        debug!(task = %task.id, "Applying create");
        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.extend(self.tasks.iter().cloned());
        next.push(task);
        self.tasks = Arc::from(next);
        self.snapshot()
    }

    /// Replace the task with the same id in place. Unknown ids are dropped silently.
    pub fn apply_update(&mut self, task: Task) -> TaskSnapshot {
        let Some(position) = self.tasks.iter().position(|current| current.id == task.id) else {
            debug!(task = %task.id, "Ignoring update for unknown task");
            return self.snapshot();
        };
        debug!(task = %task.id, position, "Applying update");
        let mut next = self.tasks.to_vec();
        next[position] = task;
        self.tasks = Arc::from(next);
        self.snapshot()
    }

    /// Remove the task with the given id. Unknown ids are a no-op.
    pub fn apply_delete(&mut self, id: TaskId) -> TaskSnapshot {
        if self.get(id).is_none() {
            debug!(task = %id, "Ignoring delete for unknown task");
            return self.snapshot();
        }
        debug!(task = %id, "Applying delete");
        let next: Vec<Task> = self.tasks.iter().filter(|task| task.id != id).cloned().collect();
        self.tasks = Arc::from(next);
        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use taskdeck_core::TaskDraft;
    use time::macros::datetime;

    fn fixed_task_id(n: u8) -> TaskId {
        TaskId::from_str(&format!("00000000-0000-0000-0000-0000000000{n:02}"))
            .unwrap_or_else(|err| panic!("must parse task id: {err}"))
    }

    fn task(n: u8, title: &str) -> Task {
        Task::from_draft(
            fixed_task_id(n),
            datetime!(2025-01-01 00:00 UTC),
            TaskDraft {
                title: title.into(),
                ..TaskDraft::default()
            },
        )
    }

    fn titles(snapshot: &[Task]) -> Vec<&str> {
        snapshot.iter().map(|task| task.title.as_str()).collect()
    }

    #[test]
    fn create_appends_in_order() {
        let mut store = TaskStore::new();
        store.apply_create(task(1, "first"));
        let snapshot = store.apply_create(task(2, "second"));
        assert_eq!(titles(&snapshot), vec!["first", "second"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn update_replaces_in_place_and_preserves_order() {
        let mut store = TaskStore::new();
        store.load(vec![task(1, "a"), task(2, "b"), task(3, "c")]);

        let mut edited = task(2, "B!");
        edited.completed = true;
        let snapshot = store.apply_update(edited.clone());

        assert_eq!(titles(&snapshot), vec!["a", "B!", "c"]);
        assert_eq!(store.get(fixed_task_id(2)), Some(&edited));
    }

    #[test]
    fn update_of_unknown_id_is_dropped() {
        let mut store = TaskStore::new();
        let before = store.load(vec![task(1, "a")]);
        let after = store.apply_update(task(9, "ghost"));
        assert_eq!(&*before, &*after);
        assert!(store.get(fixed_task_id(9)).is_none());
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = TaskStore::new();
        store.load(vec![task(1, "a"), task(2, "b")]);
        let once = store.apply_delete(fixed_task_id(1));
        let twice = store.apply_delete(fixed_task_id(1));
        assert_eq!(titles(&once), vec!["b"]);
        assert_eq!(&*once, &*twice);
    }

    #[test]
    fn create_then_delete_restores_prior_snapshot() {
        let mut store = TaskStore::new();
        let before = store.load(vec![task(1, "a"), task(2, "b")]);
        store.apply_create(task(3, "temporary"));
        let after = store.apply_delete(fixed_task_id(3));
        assert_eq!(&*before, &*after);
    }

    #[test]
    fn earlier_snapshots_are_never_mutated() {
        let mut store = TaskStore::new();
        let initial = store.load(vec![task(1, "a")]);
        let after_create = store.apply_create(task(2, "b"));
        store.apply_update(task(1, "changed"));
        store.apply_delete(fixed_task_id(2));

        assert_eq!(titles(&initial), vec!["a"]);
        assert_eq!(titles(&after_create), vec!["a", "b"]);
        assert_eq!(titles(&store.snapshot()), vec!["changed"]);
    }
}
